use cinelist_import::ImportError;
use cinelist_lib::{SettingsError, StoreError};
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Opening the database failed
    #[error("Database error: {0}")]
    Database(String),

    /// List, movie, or user operation failed
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Snapshot export or import failed
    #[error("{0}")]
    Import(#[from] ImportError),

    /// Settings file or environment error
    #[error("Config error: {0}")]
    Settings(#[from] SettingsError),

    /// Bad command-line value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
