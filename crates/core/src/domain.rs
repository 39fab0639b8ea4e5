//! Exclusion of non-article links.
//!
//! Alert emails are full of chrome: the redirect hosts themselves, share buttons
//! for social networks, and `xmlns` namespace URIs such as
//! `http://www.w3.org/1999/xhtml` that show up verbatim in the markup. None of
//! them are articles.

/// Tokens whose presence anywhere in a URL marks it as excluded.
///
/// Matching is a case-insensitive substring test, so every entry is a full
/// domain rather than a generic word.
pub const DEFAULT_EXCLUDED_DOMAINS: &[&str] = &[
    "google.com",
    "googleusercontent.com",
    "facebook.com",
    "twitter.com",
    "linkedin.com",
    "youtube.com",
    "w3.org",
];

/// Check a URL against the default exclusion list.
pub fn is_excluded_domain(url: &str) -> bool {
    is_excluded_domain_with(url, DEFAULT_EXCLUDED_DOMAINS)
}

/// Check a URL against a custom exclusion list.
///
/// Any URL whose lower-cased form contains one of `exclude` counts as excluded;
/// malformed URLs go through the same substring comparison.
pub fn is_excluded_domain_with<S: AsRef<str>>(url: &str, exclude: &[S]) -> bool {
    let url_lower = url.to_lowercase();
    exclude.iter().any(|token| {
        let token = token.as_ref();
        !token.is_empty() && url_lower.contains(&token.to_lowercase())
    })
}
