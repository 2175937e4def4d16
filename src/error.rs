use thiserror::Error;

use crate::config::ConfigError;

/// A specialized `Result` type for the bridge's startup path.
pub type AppResult<T> = Result<T, AppError>;

/// Unified application error type.
///
/// Only startup can fail the process. A serial open failure is not an
/// `AppError`: the binary logs it and keeps serving HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("An I/O error occurred: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
