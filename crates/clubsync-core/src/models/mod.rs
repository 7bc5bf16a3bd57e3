//! Data models for clubsync

mod entity;
mod payloads;
mod queue_entry;
mod record;
mod sync_conflict;

pub use entity::{Entity, EntityKind};
pub use payloads::{Group, GroupCategory, Message, Profile, Trip};
pub use queue_entry::{Operation, SyncQueueEntry};
pub use record::{Record, RecordId};
pub use sync_conflict::{ConflictWinner, SyncConflict};
