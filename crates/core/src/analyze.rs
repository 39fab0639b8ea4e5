//! The per-channel analysis run: fetch, extract, classify, report.
//!
//! [`Analyzer::run`] produces the [`AnalysisReport`] document that is written to
//! disk as JSON and later read back by the aggregator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use crate::Result;
use crate::alert::Alert;
use crate::channel::Channel;
use crate::classify::{Classifier, Decision};
use crate::extract::ExtractConfig;
use crate::message::{MessageQuery, MessageSource};

/// One classified alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertResult {
    #[serde(default)]
    pub alert: Alert,
    #[serde(default)]
    pub decision: Decision,
}

/// Mailbox counts for the queried window.
///
/// Runs record `processed`/`skipped`; older Scholar reports carry the mailbox
/// `unread`/`read` split instead. Any of them may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unread: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<usize>,
}

/// A stored analysis run.
///
/// `configuration` is free-form so reports from older runs with different
/// settings still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub configuration: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,
    #[serde(default)]
    pub total_alerts: usize,
    #[serde(default)]
    pub relevant_alerts: usize,
    #[serde(default)]
    pub results: Vec<AlertResult>,
}

impl AnalysisReport {
    pub fn relevance_rate(&self) -> f64 {
        self.relevant_alerts as f64 / self.total_alerts.max(1) as f64 * 100.0
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        Ok(if pretty { serde_json::to_string_pretty(self)? } else { serde_json::to_string(self)? })
    }
}

/// Configuration for an analysis run
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Which messages to fetch
    pub query: MessageQuery,
    /// Extraction settings
    pub extract: ExtractConfig,
    /// Skip alerts in which no article survived extraction
    pub skip_empty: bool,
}

impl AnalyzerConfig {
    pub fn new(channel: Channel) -> Self {
        Self { query: MessageQuery::new(channel), extract: ExtractConfig::default(), skip_empty: false }
    }
}

/// Runs one channel through a message source and a classifier.
pub struct Analyzer<'a> {
    source: &'a dyn MessageSource,
    classifier: &'a dyn Classifier,
    config: AnalyzerConfig,
}

impl<'a> Analyzer<'a> {
    pub fn new(source: &'a dyn MessageSource, classifier: &'a dyn Classifier, config: AnalyzerConfig) -> Self {
        Self { source, classifier, config }
    }

    pub fn channel(&self) -> Channel {
        self.config.query.channel
    }

    /// Run the pipeline with the current time as the report timestamp.
    pub fn run(&self) -> Result<AnalysisReport> {
        self.run_at(OffsetDateTime::now_utc())
    }

    /// Run the pipeline, stamping the report with `now`.
    ///
    /// Only a failing message source aborts the run; a failing classifier call
    /// is recorded as an `error` verdict for that alert.
    pub fn run_at(&self, now: OffsetDateTime) -> Result<AnalysisReport> {
        let query = &self.config.query;
        info!(channel = %query.channel, search = %query.to_search_string_at(now), "fetching alerts");

        let messages = self.source.fetch(query)?;
        let total = messages.len();
        let mut results = Vec::with_capacity(total);

        for (i, message) in messages.iter().enumerate() {
            let alert = Alert::from_message(message, query.channel, &self.config.extract);
            if self.config.skip_empty && alert.is_empty() {
                debug!(message_id = %alert.message_id, "no articles, skipping");
                continue;
            }

            debug!(n = i + 1, total, query = %alert.alert_query, articles = alert.articles.len(), "classifying");
            let decision = match self.classifier.classify(&alert) {
                Ok(decision) => decision.with_counts(),
                Err(err) => {
                    warn!(message_id = %alert.message_id, error = %err, "classification failed");
                    Decision::failed("error", format!("Error during categorization: {}", err))
                }
            };

            results.push(AlertResult { alert, decision });
        }

        let relevant_alerts = results.iter().filter(|r| r.decision.is_alert_relevant()).count();
        let statistics = Statistics {
            total,
            processed: Some(results.len()),
            skipped: Some(total - results.len()),
            ..Default::default()
        };

        Ok(AnalysisReport {
            timestamp: now.format(&Rfc3339).unwrap_or_default(),
            configuration: self.configuration(),
            statistics: Some(statistics),
            total_alerts: results.len(),
            relevant_alerts,
            results,
        })
    }

    fn configuration(&self) -> Map<String, Value> {
        let query = &self.config.query;
        let mut map = Map::new();
        map.insert("channel".to_string(), Value::from(query.channel.as_str()));
        map.insert("llm_provider".to_string(), Value::from(self.classifier.name()));
        map.insert("llm_model".to_string(), Value::from(self.classifier.model()));
        map.insert("days_back".to_string(), query.days_back.map(Value::from).unwrap_or(Value::Null));
        map.insert("days_back_start".to_string(), query.days_back_start.map(Value::from).unwrap_or(Value::Null));
        map.insert("max_emails".to_string(), Value::from(query.max_results));
        map
    }
}
