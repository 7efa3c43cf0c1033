use thiserror::Error;

use crate::elasticpath::CommerceError;
use crate::storage::StoreError;

/// Startup configuration errors.
///
/// These are fatal: the binary reports them to the operator and exits
/// with a non-zero status.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set (or is empty)
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    /// An environment variable is set but cannot be parsed
    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Centralized error types for the application
///
/// Every layer has its own error enum; they all convert into this one so the
/// binary can propagate with `?` and report consistently.
///
/// # Example
///
/// ```no_run
/// use shopcore::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Elasticpath API errors
    #[error("Commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Session store errors
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// Telegram API errors
    #[cfg(feature = "telegram")]
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP errors outside the commerce client (image downloads, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors (upload files, etc.)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
