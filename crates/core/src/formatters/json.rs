use crate::Result;
use crate::aggregate::AggregatedArticle;

/// Render the list as a pretty-printed JSON array.
pub fn render_json(articles: &[AggregatedArticle]) -> Result<String> {
    Ok(serde_json::to_string_pretty(articles)?)
}
