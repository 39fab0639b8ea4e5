use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AlertError;

/// The alerting product a message came from.
///
/// The channel decides which subject prefix is stripped to recover the alert
/// query, which sender address a mailbox is searched for, and how aggregated
/// articles are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Google Alerts (news/web results).
    GoogleAlerts,
    /// Google Scholar Alerts (papers and citations).
    ScholarAlerts,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::GoogleAlerts, Channel::ScholarAlerts];

    /// Subject prefixes the product puts before the alert query, longest first.
    pub fn subject_prefixes(self) -> &'static [&'static str] {
        match self {
            Channel::GoogleAlerts => &["Google Alert - "],
            Channel::ScholarAlerts => &["Google Scholar Alert - ", "Scholar Alert - "],
        }
    }

    /// Sender address alert emails arrive from.
    pub fn sender(self) -> &'static str {
        match self {
            Channel::GoogleAlerts => "googlealerts-noreply@google.com",
            Channel::ScholarAlerts => "scholaralerts-noreply@google.com",
        }
    }

    /// Human-readable label used in text and Markdown listings.
    pub fn label(self) -> &'static str {
        match self {
            Channel::GoogleAlerts => "Google Alert",
            Channel::ScholarAlerts => "Scholar Alert",
        }
    }

    /// Serialized name (`google_alerts` / `scholar_alerts`).
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::GoogleAlerts => "google_alerts",
            Channel::ScholarAlerts => "scholar_alerts",
        }
    }

    /// Suffix for per-channel output files (`report_google.md`).
    pub fn file_suffix(self) -> &'static str {
        match self {
            Channel::GoogleAlerts => "google",
            Channel::ScholarAlerts => "scholar",
        }
    }

    /// Strip the channel's subject prefix, returning the alert query.
    ///
    /// Subjects without a known prefix are returned verbatim.
    pub fn alert_query(self, subject: &str) -> String {
        self.subject_prefixes()
            .iter()
            .find_map(|prefix| subject.strip_prefix(prefix))
            .unwrap_or(subject)
            .to_string()
    }

    /// Guess the channel from a subject line by its prefix.
    pub fn from_subject(subject: &str) -> Option<Channel> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.subject_prefixes().iter().any(|prefix| subject.starts_with(prefix)))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "google_alerts" | "google-alerts" | "primary" => Ok(Channel::GoogleAlerts),
            "scholar" | "scholar_alerts" | "scholar-alerts" | "secondary" => Ok(Channel::ScholarAlerts),
            _ => Err(AlertError::ConfigError(format!("Invalid channel: {}. Valid options: google, scholar", s))),
        }
    }
}
