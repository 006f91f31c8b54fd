//! Core error types for orderdesk-core.
//!
//! The classifier and the watchdog state machine are total and never fail.
//! Errors only come from the edges: configuration files, the orders API,
//! and the sign-out action handed to the watchdog.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for orderdesk-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Orders API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The sign-out action invoked by the watchdog failed.
    /// Not retried.
    #[error("Sign-out failed: {message}")]
    SignOut { message: String },

    /// The watchdog task ended abnormally (panicked or was aborted)
    #[error("Watchdog task failed: {0}")]
    Watchdog(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// No usable configuration directory
    #[error("Configuration directory unavailable: {0}")]
    NoDataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Warning would fire at or before the session starts
    #[error("warning_lead_ms ({lead_ms}) must be smaller than idle_timeout_ms ({idle_ms})")]
    WarningLeadTooLong { lead_ms: u64, idle_ms: u64 },

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Orders API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport or body decoding failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    /// Base URL or path could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<tokio::task::JoinError> for CoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        CoreError::Watchdog(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
