//! Chronological article aggregation across analysis reports.
//!
//! Each channel's analysis run is stored as an [`AnalysisReport`] JSON file.
//! This module flattens those reports into a single list of
//! [`AggregatedArticle`]s, one per annotated article, which the formatters then
//! filter, sort (newest first) and render.

use std::cmp::Reverse;
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use tracing::warn;

use crate::analyze::{AlertResult, AnalysisReport};
use crate::channel::Channel;
use crate::classify::Annotations;

const UNKNOWN_QUERY: &str = "Unknown Query";
const UNKNOWN_DATE: &str = "Unknown Date";
const NO_TITLE: &str = "No Title";

/// One article in the combined, chronological list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedArticle {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub date: String,
    pub source: Channel,
    pub alert_query: String,
    pub is_relevant: bool,
    pub relevance_reasoning: String,
}

impl AggregatedArticle {
    /// Best-effort timestamp for sorting; unparseable dates sort as the Unix epoch.
    pub fn sort_key(&self) -> OffsetDateTime {
        parse_date(&self.date).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

/// Parse a report date, trying RFC 3339, RFC 2822 and a few ISO-like layouts in order.
///
/// Dates without an offset are taken as UTC.
pub fn parse_date(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();

    if let Ok(dt) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(dt);
    }
    if let Ok(dt) = OffsetDateTime::parse(value, &Rfc2822) {
        return Some(dt);
    }

    // Python-style isoformat() output: optional fractional seconds, no offset
    let naive = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ];
    if let Some(dt) = naive.iter().find_map(|format| PrimitiveDateTime::parse(value, *format).ok()) {
        return Some(dt.assume_utc());
    }

    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// Flatten one alert result into aggregated articles.
///
/// Per-article verdicts win; legacy results without them fall back to the
/// alert's raw articles with the alert-level verdict.
fn flatten_result(result: &AlertResult, channel: Channel) -> Vec<AggregatedArticle> {
    let alert = &result.alert;
    let alert_query = non_empty_or(&alert.alert_query, UNKNOWN_QUERY);
    let date = non_empty_or(&alert.date, UNKNOWN_DATE);

    match result.decision.annotations() {
        Annotations::PerArticle(verdicts) => verdicts
            .iter()
            .map(|verdict| AggregatedArticle {
                title: non_empty_or(&verdict.title, NO_TITLE),
                url: verdict.url.clone(),
                summary: verdict.summary.clone(),
                date: date.clone(),
                source: channel,
                alert_query: alert_query.clone(),
                is_relevant: verdict.is_relevant,
                relevance_reasoning: verdict.relevance_reasoning.clone(),
            })
            .collect(),
        Annotations::AlertLevel { is_relevant, reasoning } => alert
            .articles
            .iter()
            .map(|article| AggregatedArticle {
                title: non_empty_or(&article.title, NO_TITLE),
                url: article.url.clone(),
                summary: article.snippet.clone(),
                date: date.clone(),
                source: channel,
                alert_query: alert_query.clone(),
                is_relevant,
                relevance_reasoning: reasoning.to_string(),
            })
            .collect(),
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() { fallback.to_string() } else { value.to_string() }
}

/// Flatten reports, each tagged with the channel it came from, in input order.
pub fn aggregate<'a, I>(documents: I) -> Vec<AggregatedArticle>
where
    I: IntoIterator<Item = (&'a AnalysisReport, Channel)>,
{
    documents
        .into_iter()
        .flat_map(|(report, channel)| report.results.iter().flat_map(move |result| flatten_result(result, channel)))
        .collect()
}

/// Read a report file and flatten it.
///
/// A missing file or invalid JSON contributes no articles and logs a warning,
/// so one bad channel never blocks the other.
pub fn load_report(path: impl AsRef<Path>, channel: Channel) -> Vec<AggregatedArticle> {
    let path = path.as_ref();

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "report not readable, skipping");
            return Vec::new();
        }
    };

    match serde_json::from_str::<AnalysisReport>(&text) {
        Ok(report) => aggregate([(&report, channel)]),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "invalid report JSON, skipping");
            Vec::new()
        }
    }
}

/// Drop non-relevant articles unless `include_irrelevant` is set.
pub fn filter_relevant(articles: Vec<AggregatedArticle>, include_irrelevant: bool) -> Vec<AggregatedArticle> {
    if include_irrelevant { articles } else { articles.into_iter().filter(|a| a.is_relevant).collect() }
}

/// Sort newest first. Ties keep their input order.
pub fn sort_newest_first(articles: &mut [AggregatedArticle]) {
    articles.sort_by_key(|article| Reverse(article.sort_key()));
}

/// Split a combined list into per-channel lists, preserving order.
pub fn split_by_channel(articles: &[AggregatedArticle]) -> Vec<(Channel, Vec<AggregatedArticle>)> {
    Channel::ALL
        .iter()
        .map(|&channel| (channel, articles.iter().filter(|a| a.source == channel).cloned().collect::<Vec<_>>()))
        .filter(|(_, list)| !list.is_empty())
        .collect()
}
