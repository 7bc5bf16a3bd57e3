use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] clubsync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No payload provided; pass JSON as an argument or pipe it on stdin")]
    EmptyPayload,
    #[error("Record not found: {0}")]
    RecordNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Sync is not configured. Run `clubsync config set --api-url URL` or set CLUBSYNC_API_URL."
    )]
    SyncNotConfigured,
    #[error("Remote API is unreachable; {0} pending operation(s) remain queued")]
    Offline(usize),
    #[error("Another sync is already in progress")]
    AlreadyDraining,
}
