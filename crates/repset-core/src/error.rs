//! Error types for repset-core

use thiserror::Error;

/// Result type alias using repset-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in repset-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Workout or conflict not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A queued record was modified concurrently during a compare-and-swap update
    #[error("Concurrent modification of record: {0}")]
    VersionConflict(String),

    /// Remote store error
    #[error("Remote store error: {0}")]
    Remote(String),
}

impl From<crate::remote::RemoteError> for Error {
    fn from(error: crate::remote::RemoteError) -> Self {
        Self::Remote(error.to_string())
    }
}
