//! Error types for staffdesk-core

use thiserror::Error;

use crate::remote::RemoteError;

/// Result type alias using staffdesk-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in staffdesk-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Remote store error
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),
}
