//! Error types for clubsync-core

use thiserror::Error;

/// Result type alias using clubsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in clubsync-core operations
///
/// Remote failures never show up here: the remote client reports them as
/// "unavailable" and the engine degrades to local-only behavior.
#[derive(Error, Debug)]
pub enum Error {
    /// `SQLite` error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
