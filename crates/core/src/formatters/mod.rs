//! Renderers for the chronological article list and the analysis report.

pub mod json;
pub mod markdown;
pub mod text;

use std::fmt;
use std::str::FromStr;

use crate::aggregate::{AggregatedArticle, filter_relevant, sort_newest_first};
use crate::{AlertError, Result};

pub use json::render_json;
pub use markdown::{render_analysis_markdown, render_markdown};
pub use text::render_text;

pub(crate) const NO_ARTICLES: &str = "No articles found.\n";

/// Output format for the article list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl ListFormat {
    /// File extension used when the list is written to disk
    pub fn extension(&self) -> &'static str {
        match self {
            ListFormat::Text => "txt",
            ListFormat::Markdown => "md",
            ListFormat::Json => "json",
        }
    }
}

impl fmt::Display for ListFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListFormat::Text => "text",
            ListFormat::Markdown => "markdown",
            ListFormat::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for ListFormat {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ListFormat::Text),
            "markdown" | "md" => Ok(ListFormat::Markdown),
            "json" => Ok(ListFormat::Json),
            other => Err(AlertError::ConfigError(format!("unknown list format: {}", other))),
        }
    }
}

/// Configuration for article list output
#[derive(Debug, Clone, Default)]
pub struct ListConfig {
    /// Rendering format
    pub format: ListFormat,
    /// Keep articles judged not relevant
    pub include_irrelevant: bool,
}

/// Filters, sorts and renders aggregated articles
pub struct ArticleListFormatter {
    config: ListConfig,
}

impl ArticleListFormatter {
    pub fn new(config: ListConfig) -> Self {
        Self { config }
    }

    pub fn format(&self, articles: Vec<AggregatedArticle>) -> Result<String> {
        format_article_list(articles, &self.config)
    }
}

/// Filter by relevance, sort newest first, then render in the configured format.
pub fn format_article_list(articles: Vec<AggregatedArticle>, config: &ListConfig) -> Result<String> {
    let mut articles = filter_relevant(articles, config.include_irrelevant);
    if articles.is_empty() {
        return Ok(NO_ARTICLES.to_string());
    }
    sort_newest_first(&mut articles);

    match config.format {
        ListFormat::Text => Ok(render_text(&articles)),
        ListFormat::Markdown => Ok(render_markdown(&articles)),
        ListFormat::Json => render_json(&articles),
    }
}
