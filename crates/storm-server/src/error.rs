//! Error types for the storm node.

use thiserror::Error;

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in node operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A storm command or query was rejected
    #[error(transparent)]
    Storm(#[from] storm_core::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable name for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Storm(e) => e.kind(),
            Error::Config(_) => "config",
            Error::Io(_) => "io",
        }
    }
}
