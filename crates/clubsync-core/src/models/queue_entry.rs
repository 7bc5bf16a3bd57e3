//! Sync queue entry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::EntityKind;
use super::record::Record;

/// Remote operation a queued entry replays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

/// A mutation that has not been confirmed by the remote API yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncQueueEntry {
    pub entry_id: Uuid,
    pub entity_type: EntityKind,
    pub operation: Operation,
    pub payload: Record,
    pub queued_at: DateTime<Utc>,
    /// Failed replay attempts so far
    #[serde(default)]
    pub attempts: u32,
}

impl SyncQueueEntry {
    pub fn new(entity_type: EntityKind, operation: Operation, payload: Record) -> Self {
        Self {
            entry_id: Uuid::now_v7(),
            entity_type,
            operation,
            payload,
            queued_at: Utc::now(),
            attempts: 0,
        }
    }
}
