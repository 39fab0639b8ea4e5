//! Error types for alertsift operations.
//!
//! The extraction core (URL resolution, domain filtering, article extraction and
//! aggregation) never fails: it degrades to "skip this item" or "keep the raw value".
//! [`AlertError`] covers the fallible edges around it: reading report files and
//! email messages, serializing output, and talking to a classifier.
//!
//! # Example
//!
//! ```rust
//! use alertsift_core::{AlertError, Result};
//!
//! fn require_body(body: &str) -> Result<&str> {
//!     if body.is_empty() {
//!         return Err(AlertError::InvalidMessage("empty body".to_string()));
//!     }
//!     Ok(body)
//! }
//! # assert!(require_body("").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for alertsift operations.
#[derive(Error, Debug)]
pub enum AlertError {
    /// File or directory not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O errors while reading messages or writing reports.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors.
    ///
    /// Returned when an analysis report or a classifier reply is not valid JSON,
    /// or when output cannot be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An email message could not be parsed.
    #[error("Invalid email message: {0}")]
    InvalidMessage(String),

    /// The classifier failed to produce a verdict.
    #[error("Classifier '{provider}' failed: {reason}")]
    Classifier { provider: String, reason: String },

    /// Invalid configuration (unknown channel name, output format, ...).
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for AlertError.
pub type Result<T> = std::result::Result<T, AlertError>;
