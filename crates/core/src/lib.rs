pub mod aggregate;
pub mod alert;
pub mod analyze;
pub mod channel;
pub mod classify;
pub mod domain;
pub mod error;
pub mod extract;
pub mod formatters;
pub mod message;
pub mod resolve;

pub use aggregate::{
    AggregatedArticle, aggregate, filter_relevant, load_report, parse_date, sort_newest_first, split_by_channel,
};
pub use alert::{Alert, Article};
pub use analyze::{AlertResult, AnalysisReport, Analyzer, AnalyzerConfig, Statistics};
pub use channel::Channel;
pub use classify::{Annotations, ArticleVerdict, Classifier, Decision, build_prompt, parse_decision};
pub use domain::{DEFAULT_EXCLUDED_DOMAINS, is_excluded_domain, is_excluded_domain_with};
pub use error::{AlertError, Result};
pub use extract::{DEFAULT_PREVIEW_CHARS, ExtractConfig, extract_alert, extract_alert_with_config, extract_articles};
pub use formatters::{ArticleListFormatter, ListConfig, ListFormat, format_article_list};
pub use formatters::{render_analysis_markdown, render_json, render_markdown, render_text};
#[cfg(feature = "eml")]
pub use message::{EmlDirectorySource, parse_eml};
pub use message::{MessageQuery, MessageSource, RawMessage};
pub use resolve::{DEFAULT_SIBLING_MARKERS, ResolverConfig, extract_actual_url, is_redirect_url, resolve_url_with_config};
