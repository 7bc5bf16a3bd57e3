//! Last-write-wins merge of remote and local record sets.

use std::collections::HashMap;

use chrono::Utc;

use crate::models::{ConflictWinner, EntityKind, Record, RecordId, SyncConflict};

const LWW_STRATEGY: &str = "lww";

/// Merged records plus the decisions taken on ids present on both sides
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome<P> {
    pub records: Vec<Record<P>>,
    pub conflicts: Vec<SyncConflict>,
}

/// Merge `local` into `remote`.
///
/// Remote order is kept and local-only records are appended. When both sides
/// hold an id, the copy with the strictly later effective timestamp wins; ties
/// keep the remote copy. Client clocks are trusted as-is.
pub fn merge_records<P>(
    kind: EntityKind,
    remote: Vec<Record<P>>,
    local: Vec<Record<P>>,
) -> MergeOutcome<P> {
    let mut records = remote;
    let mut positions: HashMap<RecordId, usize> = HashMap::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        positions.entry(record.id.clone()).or_insert(position);
    }

    let mut conflicts = Vec::new();
    for local_record in local {
        let Some(&position) = positions.get(&local_record.id) else {
            positions.insert(local_record.id.clone(), records.len());
            records.push(local_record);
            continue;
        };

        let local_modified = local_record.effective_timestamp();
        let remote_modified = records[position].effective_timestamp();
        if local_modified == remote_modified {
            continue;
        }

        let winner = if local_modified > remote_modified {
            ConflictWinner::Local
        } else {
            ConflictWinner::Remote
        };
        conflicts.push(SyncConflict {
            id: 0,
            entity_type: kind,
            record_id: local_record.id.clone(),
            local_modified,
            remote_modified,
            winner,
            strategy: LWW_STRATEGY.to_string(),
            resolved_at: Utc::now(),
        });

        if winner == ConflictWinner::Local {
            records[position] = local_record;
        }
    }

    MergeOutcome { records, conflicts }
}
