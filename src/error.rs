//! Error types for lms-client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors fall into three families: transport errors (HTTP, timeouts,
//! retries exhausted), protocol errors (the server sent a body or link the
//! pagination protocol does not allow), and usage errors (the caller asked
//! the collection for something it cannot answer).

use thiserror::Error;

/// The main error type for lms-client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // HTTP / Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Pagination Protocol Errors
    // ============================================================================
    #[error("The key <{key}> does not exist in the response")]
    MissingRootKey { key: String },

    #[error("Next page link '{link}' is outside the configured base URL '{base_url}'")]
    ForeignNextLink { link: String, base_url: String },

    #[error("Unexpected response body: {message}")]
    UnexpectedBody { message: String },

    // ============================================================================
    // Collection Usage Errors
    // ============================================================================
    #[error("Index {index} out of range for exhausted collection of {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Column '{column}' not found in any materialized record")]
    ColumnNotFound { column: String },

    #[error("'{kind}' has no action named '{action}'")]
    UnknownAction { kind: &'static str, action: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a missing root key error
    pub fn missing_root_key(key: impl Into<String>) -> Self {
        Self::MissingRootKey { key: key.into() }
    }

    /// Create a foreign next-link error
    pub fn foreign_next_link(link: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::ForeignNextLink {
            link: link.into(),
            base_url: base_url.into(),
        }
    }

    /// Create an unexpected body error
    pub fn unexpected_body(message: impl Into<String>) -> Self {
        Self::UnexpectedBody {
            message: message.into(),
        }
    }

    /// Create a column-not-found error
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Create an unknown action error
    pub fn unknown_action(kind: &'static str, action: impl Into<String>) -> Self {
        Self::UnknownAction {
            kind,
            action: action.into(),
        }
    }

    /// Check if this error is a pagination protocol error
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Error::MissingRootKey { .. }
                | Error::ForeignNextLink { .. }
                | Error::UnexpectedBody { .. }
        )
    }

    /// Check if this error is a collection usage error
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::IndexOutOfRange { .. }
                | Error::ColumnNotFound { .. }
                | Error::UnknownAction { .. }
        )
    }

    /// Check if this error is retryable at the transport layer
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for lms-client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
