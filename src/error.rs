// src/error.rs

//! Unified error handling for the tender watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// Per-item and per-portal variants (`Navigation`, `Extraction`, `Auth`,
/// `Adapter`) are absorbed locally and only show up in counts and logs;
/// `Reconciliation` is the single variant that crosses a cycle boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

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

    /// Navigation failure (timeout, network) for a single URL or path
    #[error("Navigation error for {url}: {message}")]
    Navigation { url: String, message: String },

    /// A candidate record could not be extracted (e.g. required field missing)
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Login could not be confirmed on a portal
    #[error("Auth error for {portal}: {message}")]
    Auth { portal: String, message: String },

    /// Unrecoverable adapter-level error; aborts that portal for the cycle
    #[error("Adapter error for {portal}: {message}")]
    Adapter { portal: String, message: String },

    /// Store write failure during reconciliation; aborts the cycle
    #[error("Reconciliation error: {0}")]
    Reconciliation(String),

    /// Notification dispatch failure; logged, never fatal
    #[error("Notification error: {0}")]
    Notification(String),
}

impl AppError {
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

    /// Create a navigation error with the URL that failed.
    pub fn navigation(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an extraction error.
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Create an auth error with portal context.
    pub fn auth(portal: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Auth {
            portal: portal.into(),
            message: message.to_string(),
        }
    }

    /// Create an adapter error with portal context.
    pub fn adapter(portal: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Adapter {
            portal: portal.into(),
            message: message.to_string(),
        }
    }

    /// Create a reconciliation error.
    pub fn reconciliation(message: impl fmt::Display) -> Self {
        Self::Reconciliation(message.to_string())
    }
}
