//! Error types for the persona client resolution engine.

use std::time::Duration;
use thiserror::Error;

/// Failures of a background metadata fetch.
///
/// These never leave the prefetch cache: they are logged at the cache boundary
/// and converted into "metadata absent".
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("Fetch failed: {0}")]
    Failed(String),

    #[error("Fetch task panicked: {0}")]
    Panicked(String),

    #[error("Fetch did not complete within {0:?}")]
    Timeout(Duration),
}

/// Settings store errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings storage error: {0}")]
    Storage(String),

    #[error("Setting '{key}' has type {actual}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Settings serialization error: {0}")]
    Serialization(String),

    #[error("Invalid settings import: {0}")]
    InvalidImport(String),
}

/// Top-level API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unknown client type: {0}")]
    UnknownClientType(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::MalformedInput(err.to_string())
    }
}
