//! Sync conflict model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use super::record::RecordId;

/// Which copy survived a last-write-wins decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictWinner {
    Local,
    Remote,
}

impl ConflictWinner {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Recorded sync conflict resolved by strategy (e.g., LWW)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    /// Conflict row identifier (0 until persisted)
    pub id: i64,
    pub entity_type: EntityKind,
    pub record_id: RecordId,
    /// Local copy's effective timestamp
    pub local_modified: DateTime<Utc>,
    /// Remote copy's effective timestamp
    pub remote_modified: DateTime<Utc>,
    pub winner: ConflictWinner,
    /// Resolution strategy name
    pub strategy: String,
    pub resolved_at: DateTime<Utc>,
}
