//! Error types for the wp-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// provides one error interface for the frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Form error: {0}")]
    Form(String),

    #[error("Could not load settings: {0}")]
    MalformedSettings(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("No session id available")]
    NoSession,

    #[error("No successful plot to save")]
    NothingToSave,

    #[error("This plot is already saved")]
    AlreadySaved,

    #[error("Saved plot {index} does not exist ({len} saved)")]
    SavedPlotNotFound { index: usize, len: usize },

    #[error("Table catalog error: {0}")]
    Catalog(String),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for wp-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<wp_form::FormError> for AppError {
    fn from(err: wp_form::FormError) -> Self {
        match err {
            wp_form::FormError::MalformedSettings(message) => AppError::MalformedSettings(message),
            other => AppError::Form(other.to_string()),
        }
    }
}

impl From<wp_store::StoreError> for AppError {
    fn from(err: wp_store::StoreError) -> Self {
        match err {
            err @ wp_store::StoreError::InvalidSessionId { .. } => {
                AppError::InvalidSessionId(err.to_string())
            }
            other => AppError::Store(other.to_string()),
        }
    }
}
