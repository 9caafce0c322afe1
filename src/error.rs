// src/error.rs

//! Unified error handling for the notifier.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for notifier operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Source could not be fetched (network failure, timeout, non-success status)
    #[error("Fetch error for {endpoint}: {message}")]
    Fetch { endpoint: String, message: String },

    /// Every extraction strategy came up empty
    #[error("Structural parse error: {0}")]
    StructuralParse(String),

    /// Fragment contains no date token
    #[error("Not a date fragment: {0:?}")]
    NotADate(String),

    /// Date-shaped token that is not a valid calendar date
    #[error("Invalid date {token:?}: {message}")]
    DateFormat { token: String, message: String },

    /// Snapshot unreadable or unwritable
    #[error("Persistence error at {path}: {message}")]
    Persistence { path: String, message: String },

    /// Message delivery failed
    #[error("Notify error: {0}")]
    Notify(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error for an endpoint.
    pub fn fetch(endpoint: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Create a structural parse error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralParse(message.into())
    }

    /// Create a date format error.
    pub fn date_format(token: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::DateFormat {
            token: token.into(),
            message: message.to_string(),
        }
    }

    /// Create a persistence error for a path.
    pub fn persistence(path: &Path, message: impl fmt::Display) -> Self {
        Self::Persistence {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a delivery error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error aborts the whole run rather than a single item.
    pub fn is_run_fatal(&self) -> bool {
        !matches!(
            self,
            Self::NotADate(_) | Self::DateFormat { .. } | Self::Notify(_)
        )
    }
}
