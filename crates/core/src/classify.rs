//! Relevance classification boundary.
//!
//! The language-model call itself is an external collaborator: provider
//! adapters implement [`Classifier`] and hand back a [`Decision`]. This module
//! owns the verdict types, the prompt those adapters send, and the tolerant
//! parsing of their JSON replies.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;
use crate::alert::Alert;

/// Relevance verdict for a single article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleVerdict {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub is_relevant: bool,
    #[serde(default)]
    pub relevance_reasoning: String,
}

/// The classifier's verdict for one alert.
///
/// Reports written before per-article analysis existed carry no `articles` and no
/// counts; see [`Decision::annotations`] for how those are read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default)]
    pub is_relevant: bool,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub articles: Vec<ArticleVerdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant_article_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_article_count: Option<usize>,
}

/// How relevance is attached to the articles of an alert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Annotations<'a> {
    /// One verdict per article.
    PerArticle(&'a [ArticleVerdict]),
    /// Legacy shape: the alert-level verdict stands in for every article.
    AlertLevel { is_relevant: bool, reasoning: &'a str },
}

impl Decision {
    /// The not-relevant, zero-confidence verdict recorded when classification fails.
    pub fn failed(category: &str, reason: impl Into<String>) -> Self {
        Self {
            is_relevant: false,
            confidence: 0.0,
            category: category.to_string(),
            reasoning: reason.into(),
            summary: "Could not categorize".to_string(),
            ..Default::default()
        }
    }

    pub fn annotations(&self) -> Annotations<'_> {
        if self.articles.is_empty() {
            Annotations::AlertLevel { is_relevant: self.is_relevant, reasoning: &self.reasoning }
        } else {
            Annotations::PerArticle(&self.articles)
        }
    }

    /// Fill missing article counts from the per-article verdicts.
    pub fn with_counts(mut self) -> Self {
        if !self.articles.is_empty() {
            self.total_article_count.get_or_insert(self.articles.len());
            let relevant = self.articles.iter().filter(|a| a.is_relevant).count();
            self.relevant_article_count.get_or_insert(relevant);
        }
        self
    }

    /// An alert counts as relevant when the verdict says so and, if per-article
    /// counts are known, at least one article is relevant.
    pub fn is_alert_relevant(&self) -> bool {
        self.is_relevant && self.relevant_article_count.is_none_or(|count| count > 0)
    }
}

/// A relevance classifier (one implementation per language-model provider).
pub trait Classifier {
    /// Provider name recorded in reports (`openai`, `gemini`, ...)
    fn name(&self) -> &str;
    /// Model identifier recorded in reports
    fn model(&self) -> &str;
    fn classify(&self, alert: &Alert) -> Result<Decision>;
}

/// Render the prompt a provider adapter sends for `alert`.
///
/// `topic` describes what counts as relevant.
pub fn build_prompt(alert: &Alert, topic: &str) -> String {
    let mut articles = String::new();
    for (i, article) in alert.articles.iter().enumerate() {
        let title = if article.title.is_empty() { "N/A" } else { &article.title };
        articles.push_str(&format!("\n{}. Title: {}\n   URL: {}\n", i + 1, title, article.url));
        if !article.snippet.is_empty() {
            articles.push_str(&format!("   Snippet: {}\n", article.snippet));
        }
    }

    format!(
        "You are screening alert emails for articles relevant to the following topic:\n\
         {topic}\n\n\
         Alert query: {query}\n\
         Date: {date}\n\n\
         Articles in this alert:\n{articles}\n\
         For every article decide whether it is relevant to the topic, then give an overall verdict.\n\n\
         Respond only with JSON of this shape:\n\
         {{\n\
         \x20   \"is_relevant\": boolean,\n\
         \x20   \"confidence\": float between 0.0 and 1.0,\n\
         \x20   \"category\": \"string\",\n\
         \x20   \"reasoning\": \"string\",\n\
         \x20   \"summary\": \"one sentence\",\n\
         \x20   \"keywords\": [\"2-5 keywords\"],\n\
         \x20   \"articles\": [{{\"title\": \"string\", \"url\": \"string\", \"summary\": \"string\", \
         \"is_relevant\": boolean, \"relevance_reasoning\": \"string\"}}]\n\
         }}",
        query = if alert.alert_query.is_empty() { "Unknown" } else { &alert.alert_query },
        date = if alert.date.is_empty() { "Unknown" } else { &alert.date },
    )
}

/// Parse a classifier's JSON reply.
///
/// Markdown code fences around the JSON are tolerated. Anything unparseable
/// becomes a `parse_error` verdict instead of an error.
pub fn parse_decision(text: &str) -> Decision {
    let trimmed = text.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    match serde_json::from_str::<Decision>(json) {
        Ok(decision) => decision.with_counts(),
        Err(err) => {
            warn!(error = %err, "could not parse classifier response");
            Decision::failed("parse_error", format!("Could not parse classifier response: {}", err))
        }
    }
}
