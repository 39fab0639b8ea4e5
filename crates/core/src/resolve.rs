//! Redirect-URL resolution.
//!
//! Alert emails never link to articles directly. Google Alerts wraps every
//! destination in `https://www.google.com/url?...&url=<dest>&...` and Scholar
//! Alerts use `https://scholar.google.com/scholar_url?url=<dest>&...` (or the
//! `scholar.googleusercontent.com/scholar?...` cache form). This module recovers
//! `<dest>`.
//!
//! Resolution never fails: anything that is not a recognized redirect, or whose
//! `url` parameter cannot be decoded, is returned unchanged.
//!
//! # Example
//!
//! ```rust
//! use alertsift_core::extract_actual_url;
//!
//! let wrapped = "https://scholar.google.com/scholar_url?url=https%3A%2F%2Farxiv.org%2Fabs%2F2312.12345";
//! assert_eq!(extract_actual_url(wrapped), "https://arxiv.org/abs/2312.12345");
//! assert_eq!(extract_actual_url("https://example.com/article"), "https://example.com/article");
//! ```

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use thiserror::Error;
use tracing::warn;

/// Generic click-tracking redirect: any `google.<tld>` host with a `/url` path.
static GENERIC_REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://(?:[a-z0-9\-]+\.)*google\.[a-z]{2,3}(?:\.[a-z]{2})?(?::\d+)?/url(?:[?#]|$)")
        .expect("generic redirect pattern")
});

/// Scholar redirect: `scholar.google.*` or `scholar.googleusercontent.com` with a
/// `/scholar_url` or `/scholar` path.
static SCHOLAR_REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[a-z][a-z0-9+.\-]*://scholar\.google(?:usercontent)?\.[a-z]{2,3}(?:\.[a-z]{2})?(?::\d+)?/scholar(?:_url)?(?:[?#/]|$)",
    )
    .expect("scholar redirect pattern")
});

/// Sibling parameters Google appends after `url=`.
///
/// `ct` tracks the click, `sa`/`rct` carry search context, `cd` the result
/// position, `usg` a usage signature, `ved` a verification token and `q` echoes
/// the query.
pub const DEFAULT_SIBLING_MARKERS: &[&str] = &["ct", "sa", "rct", "cd", "usg", "ved", "q"];

/// Configuration for redirect resolution
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Parameter names that terminate an unencoded `url=` value in the fallback pass
    pub sibling_markers: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { sibling_markers: DEFAULT_SIBLING_MARKERS.iter().map(|m| m.to_string()).collect() }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
enum DecodeError {
    #[error("truncated or non-hex percent escape at byte {0}")]
    BadEscape(usize),
    #[error("decoded bytes are not valid UTF-8")]
    NotUtf8,
}

/// Returns true when `url` is one of the recognized redirect wrappers.
pub fn is_redirect_url(url: &str) -> bool {
    GENERIC_REDIRECT.is_match(url) || SCHOLAR_REDIRECT.is_match(url)
}

/// Extract the destination URL from a Google or Scholar redirect URL.
///
/// Nested wrappers are unwrapped until the result is no longer a redirect or
/// cannot be unwrapped further. Non-redirect input is returned unchanged, so
/// the function is idempotent.
pub fn extract_actual_url(url: &str) -> String {
    resolve_url_with_config(url, &ResolverConfig::default())
}

/// Same as [`extract_actual_url`] with custom sibling markers.
pub fn resolve_url_with_config(url: &str, config: &ResolverConfig) -> String {
    let mut current = url.to_string();

    // Each successful step yields a strictly shorter string, so this terminates.
    while is_redirect_url(&current) {
        match unwrap_once(&current, config) {
            Some(dest) => current = dest,
            None => break,
        }
    }

    current
}

/// One unwrapping step. `None` means "leave this URL as it is".
fn unwrap_once(url: &str, config: &ResolverConfig) -> Option<String> {
    match structured_url_param(url) {
        Ok(Some(dest)) => return Some(dest),
        Ok(None) => {}
        Err(err) => {
            warn!(url, error = %err, "could not decode redirect url parameter");
            return None;
        }
    }

    match fallback_url_param(url, &config.sibling_markers) {
        Ok(dest) => dest,
        Err(err) => {
            warn!(url, error = %err, "could not decode redirect url parameter");
            None
        }
    }
}

/// Structured pass: split the query on `&`/`=` and decode the `url` value.
///
/// The wrapping service percent-encodes the destination, so `&` and `=` inside
/// it do not end the value early.
fn structured_url_param(url: &str) -> Result<Option<String>, DecodeError> {
    let Some((_, rest)) = url.split_once('?') else {
        return Ok(None);
    };
    let query = rest.split('#').next().unwrap_or_default();

    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != "url" {
            continue;
        }
        let decoded = percent_decode(value)?;
        if !decoded.is_empty() {
            return Ok(Some(decoded));
        }
    }

    Ok(None)
}

/// Fallback pass for producers that do not encode the destination.
///
/// Takes everything after the first `url=` up to the earliest known sibling
/// parameter (`&ct=`, `&amp;usg=`, ...) or the end of the string.
fn fallback_url_param(url: &str, markers: &[String]) -> Result<Option<String>, DecodeError> {
    let Some(start) = find_url_key(url) else {
        return Ok(None);
    };
    let tail = &url[start..];

    let end = markers
        .iter()
        .flat_map(|marker| [format!("&{}=", marker), format!("&amp;{}=", marker)])
        .filter_map(|needle| tail.find(&needle))
        .min()
        .unwrap_or(tail.len());

    let decoded = percent_decode(&tail[..end])?;
    Ok(if decoded.is_empty() { None } else { Some(decoded) })
}

/// Byte offset just past a `url=` key that starts a parameter.
fn find_url_key(url: &str) -> Option<usize> {
    url.match_indices("url=")
        .find(|(idx, _)| {
            url[..*idx].chars().next_back().is_some_and(|c| !c.is_ascii_alphanumeric() && c != '_')
        })
        .map(|(idx, key)| idx + key.len())
}

/// Percent-unescape `value` without treating `+` as a space.
fn percent_decode(value: &str) -> Result<String, DecodeError> {
    let bytes = value.as_bytes();
    for (idx, _) in value.match_indices('%') {
        let valid = bytes.get(idx + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(idx + 2).is_some_and(u8::is_ascii_hexdigit);
        if !valid {
            return Err(DecodeError::BadEscape(idx));
        }
    }

    percent_decode_str(value)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .map_err(|_| DecodeError::NotUtf8)
}
