//! Error types for the colorize core
//!
//! Range operations never fail: degenerate input is a no-op. Errors only
//! come from describing edits that cannot apply to the buffer, and from
//! decoding configuration or persisted data.

use thiserror::Error;

/// Result type alias for colorize operations
pub type Result<T> = std::result::Result<T, ColorizeError>;

/// Top-level error type
#[derive(Debug, Error)]
pub enum ColorizeError {
    /// An edit description that does not fit the document it claims to change
    #[error("Invalid change: {0}")]
    InvalidChange(String),

    /// Persisted map or JS payload is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file is not valid YAML
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The host context could not answer a lookup (view role, document identity)
    #[error("Context lookup failed: {0}")]
    Context(String),
}
