//! Message sources: where raw alert emails come from.
//!
//! Mailbox access (authentication, API paging) lives outside this crate behind
//! [`MessageSource`]. The crate ships one concrete source, [`EmlDirectorySource`],
//! which reads exported `.eml` files from disk.

#[cfg(feature = "eml")]
use std::path::{Path, PathBuf};

#[cfg(feature = "eml")]
use mail_parser::PartType;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Duration, OffsetDateTime};
#[cfg(feature = "eml")]
use tracing::warn;

use crate::Result;
#[cfg(feature = "eml")]
use crate::AlertError;
use crate::alert::Alert;
use crate::channel::Channel;
use crate::extract::{ExtractConfig, extract_alert_with_config};

/// A raw alert email as delivered by a message source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub message_id: String,
    pub subject: String,
    /// `Date:` header, as text
    pub date: String,
    /// HTML body when the message has one, otherwise the plain-text body
    pub body: String,
}

impl Alert {
    /// Run the extractor over a raw message and stamp its envelope fields.
    pub fn from_message(message: &RawMessage, channel: Channel, config: &ExtractConfig) -> Alert {
        extract_alert_with_config(&message.body, &message.subject, channel, config)
            .with_envelope(message.date.clone(), message.message_id.clone())
    }
}

/// What to fetch: one channel, a window of days, a cap on the number of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    pub channel: Channel,
    /// End of the window in days before now; `None` searches all time
    pub days_back: Option<u32>,
    /// Start of the window in days before now, when larger than `days_back`
    pub days_back_start: Option<u32>,
    pub max_results: usize,
}

impl MessageQuery {
    pub fn new(channel: Channel) -> Self {
        Self { channel, days_back: Some(7), days_back_start: None, max_results: 10 }
    }

    /// `(after, before)` bounds of the window relative to `now`.
    ///
    /// With only `days_back` set the window is the last `days_back` days. With a
    /// larger `days_back_start` it runs from `days_back_start` to `days_back` days ago.
    pub fn window_at(&self, now: OffsetDateTime) -> (Option<OffsetDateTime>, Option<OffsetDateTime>) {
        let Some(days_back) = self.days_back else {
            return (None, None);
        };
        match self.days_back_start {
            Some(start) if start > days_back => {
                (Some(now - Duration::days(start.into())), Some(now - Duration::days(days_back.into())))
            }
            _ => (Some(now - Duration::days(days_back.into())), None),
        }
    }

    /// Whether a message timestamp falls inside the window.
    pub fn contains_at(&self, timestamp: OffsetDateTime, now: OffsetDateTime) -> bool {
        let (after, before) = self.window_at(now);
        after.is_none_or(|after| timestamp >= after) && before.is_none_or(|before| timestamp < before)
    }

    /// Mailbox search expression, e.g. `from:googlealerts-noreply@google.com after:2024/01/08`.
    pub fn to_search_string_at(&self, now: OffsetDateTime) -> String {
        let format = format_description!("[year]/[month]/[day]");
        let mut query = format!("from:{}", self.channel.sender());
        let (after, before) = self.window_at(now);

        if let Some(date) = after.and_then(|d| d.format(format).ok()) {
            query.push_str(&format!(" after:{}", date));
        }
        if let Some(date) = before.and_then(|d| d.format(format).ok()) {
            query.push_str(&format!(" before:{}", date));
        }

        query
    }
}

/// Anything that can hand over raw alert emails for a query.
pub trait MessageSource {
    fn fetch(&self, query: &MessageQuery) -> Result<Vec<RawMessage>>;
}

/// Parse an RFC 5322 message, preferring its HTML body.
#[cfg(feature = "eml")]
pub fn parse_eml(bytes: &[u8]) -> Result<(RawMessage, Option<OffsetDateTime>)> {
    let message = mail_parser::MessageParser::default()
        .parse(bytes)
        .ok_or_else(|| AlertError::InvalidMessage("not an RFC 5322 message".to_string()))?;

    // body_html(0) also renders text/plain parts as HTML, so only take it for a real HTML part
    let has_html = message.html_part(0).is_some_and(|part| matches!(part.body, PartType::Html(_)));
    let body = if has_html { message.body_html(0) } else { message.body_text(0) }
        .map(|body| body.into_owned())
        .unwrap_or_default();

    let timestamp = message.date().and_then(|d| OffsetDateTime::from_unix_timestamp(d.to_timestamp()).ok());

    let raw = RawMessage {
        message_id: message.message_id().unwrap_or_default().to_string(),
        subject: message.subject().unwrap_or_default().to_string(),
        date: message.date().map(|d| d.to_rfc3339()).unwrap_or_default(),
        body,
    };

    Ok((raw, timestamp))
}

/// Reads `.eml` files from a directory, in file-name order.
///
/// Files that cannot be parsed are skipped with a warning. Messages without a
/// `Date:` header are kept regardless of the query window.
#[cfg(feature = "eml")]
#[derive(Debug, Clone)]
pub struct EmlDirectorySource {
    dir: PathBuf,
}

#[cfg(feature = "eml")]
impl EmlDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn eml_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(AlertError::FileNotFound(self.dir.clone()));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("eml")))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Fetch relative to an explicit "now".
    pub fn fetch_at(&self, query: &MessageQuery, now: OffsetDateTime) -> Result<Vec<RawMessage>> {
        let mut messages = Vec::new();

        for path in self.eml_paths()? {
            if messages.len() >= query.max_results {
                break;
            }

            let parsed = std::fs::read(&path).map_err(AlertError::from).and_then(|bytes| parse_eml(&bytes));
            let (message, timestamp) = match parsed {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable message");
                    continue;
                }
            };

            if timestamp.is_some_and(|ts| !query.contains_at(ts, now)) {
                continue;
            }
            messages.push(message);
        }

        Ok(messages)
    }
}

#[cfg(feature = "eml")]
impl MessageSource for EmlDirectorySource {
    fn fetch(&self, query: &MessageQuery) -> Result<Vec<RawMessage>> {
        self.fetch_at(query, OffsetDateTime::now_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-01-15 12:00 UTC);

    #[test]
    fn test_search_string_last_days() {
        let query = MessageQuery::new(Channel::GoogleAlerts);
        assert_eq!(query.to_search_string_at(NOW), "from:googlealerts-noreply@google.com after:2024/01/08");
    }

    #[test]
    fn test_search_string_range() {
        let query = MessageQuery { days_back: Some(7), days_back_start: Some(14), ..MessageQuery::new(Channel::ScholarAlerts) };
        assert_eq!(
            query.to_search_string_at(NOW),
            "from:scholaralerts-noreply@google.com after:2024/01/01 before:2024/01/08"
        );
    }

    #[test]
    fn test_search_string_all_time() {
        let query = MessageQuery { days_back: None, ..MessageQuery::new(Channel::GoogleAlerts) };
        assert_eq!(query.to_search_string_at(NOW), "from:googlealerts-noreply@google.com");
    }

    #[test]
    fn test_start_not_after_end_is_ignored() {
        let query = MessageQuery { days_back: Some(7), days_back_start: Some(3), ..MessageQuery::new(Channel::GoogleAlerts) };
        assert_eq!(query.window_at(NOW), (Some(datetime!(2024-01-08 12:00 UTC)), None));
    }

    #[test]
    fn test_contains() {
        let query = MessageQuery { days_back: Some(7), days_back_start: Some(14), ..MessageQuery::new(Channel::GoogleAlerts) };
        assert!(query.contains_at(datetime!(2024-01-05 00:00 UTC), NOW));
        assert!(!query.contains_at(datetime!(2024-01-10 00:00 UTC), NOW));
        assert!(!query.contains_at(datetime!(2023-12-30 00:00 UTC), NOW));
    }

    #[test]
    fn test_alert_from_message() {
        let message = RawMessage {
            message_id: "m-1".to_string(),
            subject: "Google Alert - lithium".to_string(),
            date: "2024-01-10T08:00:00Z".to_string(),
            body: r#"<a href="https://www.google.com/url?url=https://example.com/li">Lithium find</a>"#.to_string(),
        };

        let alert = Alert::from_message(&message, Channel::GoogleAlerts, &ExtractConfig::default());
        assert_eq!(alert.alert_query, "lithium");
        assert_eq!(alert.message_id, "m-1");
        assert_eq!(alert.date, "2024-01-10T08:00:00Z");
        assert_eq!(alert.articles[0].url, "https://example.com/li");
    }

    #[cfg(feature = "eml")]
    #[test]
    fn test_parse_eml_prefers_html() {
        let eml = "From: Google Alerts <googlealerts-noreply@google.com>\r\n\
                   Subject: Google Alert - copper\r\n\
                   Date: Wed, 10 Jan 2024 08:00:00 +0000\r\n\
                   Message-ID: <abc@google.com>\r\n\
                   MIME-Version: 1.0\r\n\
                   Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
                   \r\n\
                   --b1\r\n\
                   Content-Type: text/plain; charset=UTF-8\r\n\
                   \r\n\
                   plain body\r\n\
                   --b1\r\n\
                   Content-Type: text/html; charset=UTF-8\r\n\
                   \r\n\
                   <html><body><a href=\"https://example.com/cu\">Copper</a></body></html>\r\n\
                   --b1--\r\n";

        let (message, timestamp) = parse_eml(eml.as_bytes()).unwrap();
        assert_eq!(message.subject, "Google Alert - copper");
        assert_eq!(message.message_id, "abc@google.com");
        assert!(message.body.contains("<a href="));
        assert_eq!(timestamp, Some(datetime!(2024-01-10 08:00 UTC)));
    }

    #[cfg(feature = "eml")]
    #[test]
    fn test_directory_source_missing_dir() {
        let source = EmlDirectorySource::new("/definitely/not/here");
        let result = source.fetch(&MessageQuery::new(Channel::GoogleAlerts));
        assert!(matches!(result, Err(AlertError::FileNotFound(_))));
    }

    #[cfg(feature = "eml")]
    #[test]
    fn test_directory_source_skips_bad_files_and_caps() {
        let dir = tempfile::TempDir::new().unwrap();
        let eml = |subject: &str| {
            format!(
                "Subject: {subject}\r\nDate: Wed, 10 Jan 2024 08:00:00 +0000\r\nContent-Type: text/plain\r\n\r\nhttps://example.com/{subject}\r\n"
            )
        };
        std::fs::write(dir.path().join("a.eml"), eml("one")).unwrap();
        std::fs::write(dir.path().join("b.eml"), eml("two")).unwrap();
        std::fs::write(dir.path().join("c.eml"), eml("three")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let source = EmlDirectorySource::new(dir.path());
        let query = MessageQuery { days_back: None, max_results: 2, ..MessageQuery::new(Channel::GoogleAlerts) };
        let messages = source.fetch_at(&query, NOW).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].subject, "one");
        assert_eq!(messages[1].subject, "two");

        let windowed = MessageQuery { days_back: Some(1), ..query };
        assert!(source.fetch_at(&windowed, NOW).unwrap().is_empty());
    }
}
