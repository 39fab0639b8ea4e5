//! Alert and article records produced by the extractor.
//!
//! The serialized shape (`{alert_query, date, message_id, articles: [{title, url, snippet}], full_body}`)
//! is the one stored inside analysis reports, so field names must not change.

use serde::{Deserialize, Serialize};

/// A candidate article found in an alert email.
///
/// `url` has already been unwrapped from any redirect and checked against the
/// exclusion list; `title` and `snippet` may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

impl Article {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self { title: title.into(), url: url.into(), snippet: String::new() }
    }
}

/// One alert email reduced to its query and candidate articles.
///
/// Articles keep document order and are not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub alert_query: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub articles: Vec<Article>,
    /// Leading characters of the raw body, kept as context for the classifier.
    #[serde(default)]
    pub full_body: String,
}

impl Alert {
    /// Attach the envelope fields a message source knows about.
    pub fn with_envelope(mut self, date: impl Into<String>, message_id: impl Into<String>) -> Self {
        self.date = date.into();
        self.message_id = message_id.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
