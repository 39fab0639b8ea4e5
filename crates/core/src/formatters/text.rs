use crate::aggregate::AggregatedArticle;

const RULE_WIDTH: usize = 80;

fn relevance_mark(is_relevant: bool) -> &'static str {
    if is_relevant { "[x]" } else { "[ ]" }
}

/// Render the list as plain text with `=` banner rules and `-` separators.
pub fn render_text(articles: &[AggregatedArticle]) -> String {
    let banner = "=".repeat(RULE_WIDTH);
    let separator = "-".repeat(RULE_WIDTH);

    let mut lines = vec![
        banner.clone(),
        "CHRONOLOGICAL ARTICLE LIST".to_string(),
        banner.clone(),
        format!("Total Articles: {}", articles.len()),
        banner,
        String::new(),
    ];

    for (i, article) in articles.iter().enumerate() {
        lines.push(format!("{}. {} {}", i + 1, relevance_mark(article.is_relevant), article.title));
        lines.push(format!("   [{}] | Date: {}", article.source.label(), article.date));
        lines.push(format!("   Alert Query: {}", article.alert_query));
        lines.push(format!("   URL: {}", article.url));

        if !article.summary.is_empty() {
            lines.push(format!("   Summary: {}", article.summary));
        }
        if !article.relevance_reasoning.is_empty() {
            lines.push(format!("   Relevance: {}", article.relevance_reasoning));
        }

        lines.push(String::new());
        lines.push(separator.clone());
        lines.push(String::new());
    }

    lines.join("\n")
}
