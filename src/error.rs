//! Error types for the PlantOps analytics core

use std::sync::Arc;
use thiserror::Error;

/// Result type alias for PlantOps operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

/// Errors from the upstream record provider
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Authentication failed. Check the backend API key in your configuration.")]
    Unauthorized,

    #[error("Access denied. You don't have permission to read this record set.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to backend".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Cache-layer errors.
///
/// Absence of a key is never an error; the only real failure mode is the
/// supplied compute closure failing, surfaced as [`CacheError::ComputationFailed`]
/// to the executing caller and every concurrent waiter for that key.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache key must not be empty")]
    EmptyKey,

    #[error("Cache TTL must be greater than zero")]
    InvalidTtl,

    #[error("Invalid invalidation pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Computation for cache key '{key}' failed: {cause}")]
    ComputationFailed { key: String, cause: Arc<Error> },

    #[error("Computation for cache key '{key}' was interrupted before it settled")]
    FlightInterrupted { key: String },
}

impl CacheError {
    /// The underlying failure for a `ComputationFailed`, if that is what this is.
    pub fn cause(&self) -> Option<&Error> {
        match self {
            CacheError::ComputationFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
