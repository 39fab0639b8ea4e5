//! Article extraction from alert email bodies.
//!
//! Both alert products send HTML bodies where every result is an anchor wrapped
//! in a redirect. Older plain-text bodies list bare (still wrapped) URLs instead.
//! [`extract_alert`] handles both and always returns an [`Alert`], dropping only
//! the links it cannot use.
//!
//! # Example
//!
//! ```rust
//! use alertsift_core::{Channel, extract_alert};
//!
//! let body = r#"<a href="https://www.google.com/url?url=https://example.com/ore"><b>AI finds ore</b></a>"#;
//! let alert = extract_alert(body, "Google Alert - mineral exploration", Channel::GoogleAlerts);
//!
//! assert_eq!(alert.alert_query, "mineral exploration");
//! assert_eq!(alert.articles[0].title, "AI finds ore");
//! assert_eq!(alert.articles[0].url, "https://example.com/ore");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::alert::{Alert, Article};
use crate::channel::Channel;
use crate::domain::{DEFAULT_EXCLUDED_DOMAINS, is_excluded_domain_with};
use crate::resolve::{ResolverConfig, is_redirect_url, resolve_url_with_config};

/// Opening anchor tag carrying an `href`.
static ANCHOR_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<a\s[^>]*?href\s*="#).expect("anchor pattern"));

/// Bare http(s) URL token; trailing sentence punctuation is not part of it.
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"')\]]+[^\s<>"'.,;:!?)\]]"#).expect("bare url pattern"));

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));

static EMPHASIS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("b, strong, em, i").expect("emphasis selector"));

/// Default number of body characters kept in [`Alert::full_body`].
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Configuration for article extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// URLs containing any of these tokens are never articles
    pub exclude_domains: Vec<String>,
    /// Number of body characters kept as `full_body`
    pub preview_chars: usize,
    /// Redirect resolution settings
    pub resolver: ResolverConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            exclude_domains: DEFAULT_EXCLUDED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
            resolver: ResolverConfig::default(),
        }
    }
}

/// Extract an [`Alert`] from an email body with the default configuration.
pub fn extract_alert(body: &str, subject: &str, channel: Channel) -> Alert {
    extract_alert_with_config(body, subject, channel, &ExtractConfig::default())
}

/// Extract an [`Alert`] from an email body.
///
/// `date` and `message_id` are left empty; see [`Alert::with_envelope`].
pub fn extract_alert_with_config(body: &str, subject: &str, channel: Channel, config: &ExtractConfig) -> Alert {
    let alert_query = channel.alert_query(subject);
    let articles = extract_articles(body, config);

    debug!(channel = %channel, query = %alert_query, articles = articles.len(), "extracted alert");

    Alert {
        alert_query,
        date: String::new(),
        message_id: String::new(),
        articles,
        full_body: body.chars().take(config.preview_chars).collect(),
    }
}

/// Extract candidate articles from an HTML or plain-text body, in document order.
pub fn extract_articles(body: &str, config: &ExtractConfig) -> Vec<Article> {
    if has_anchor_markup(body) { articles_from_anchors(body, config) } else { articles_from_bare_urls(body, config) }
}

/// True when the body contains at least one `<a ... href=` tag.
fn has_anchor_markup(body: &str) -> bool {
    ANCHOR_MARKUP.is_match(body)
}

/// Resolve a raw link and decide whether it can be an article URL.
fn accept_url(raw: &str, config: &ExtractConfig) -> Option<String> {
    let resolved = resolve_url_with_config(raw.trim(), &config.resolver);
    let lower = resolved.to_ascii_lowercase();

    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return None;
    }
    // A wrapper left after resolution carries no destination we can use.
    if is_redirect_url(&resolved) || is_excluded_domain_with(&resolved, &config.exclude_domains) {
        return None;
    }

    Some(resolved)
}

fn articles_from_anchors(body: &str, config: &ExtractConfig) -> Vec<Article> {
    let document = Html::parse_document(body);
    let mut articles = Vec::new();
    let mut skipped = 0usize;

    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            skipped += 1;
            continue;
        };
        let Some(url) = accept_url(href, config) else {
            skipped += 1;
            continue;
        };

        let title = anchor_title(anchor);
        if title.is_empty() && url.is_empty() {
            skipped += 1;
            continue;
        }

        articles.push(Article { title, url, snippet: String::new() });
    }

    debug!(kept = articles.len(), skipped, "anchor extraction");
    articles
}

/// Prefer the first non-empty bold/emphasis text, otherwise the anchor's full text.
fn anchor_title(anchor: ElementRef<'_>) -> String {
    anchor
        .select(&EMPHASIS)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| collapse_whitespace(&anchor.text().collect::<String>()))
}

fn articles_from_bare_urls(body: &str, config: &ExtractConfig) -> Vec<Article> {
    BARE_URL
        .find_iter(body)
        .filter_map(|m| accept_url(m.as_str(), config))
        .map(|url| Article { title: String::new(), url, snippet: String::new() })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
