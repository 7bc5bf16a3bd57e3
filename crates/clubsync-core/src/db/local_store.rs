//! Durable key-value store for record collections, the sync queue and the
//! local user identity.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{ConflictWinner, Record, RecordId, SyncConflict};

/// Key holding the serialized sync queue
pub const QUEUE_KEY: &str = "sync_queue";

/// Key holding the locally generated user identifier
pub const IDENTITY_KEY: &str = "user_id";

/// Shared handle to the local store.
///
/// Cloning is cheap; every clone talks to the same connection. Each method
/// holds the connection lock for its full duration, so `upsert` is atomic
/// with respect to other callers in this process.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
}

impl LocalStore {
    /// Open a store backed by a file at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_database(Database::open(path)?))
    }

    /// Open an in-memory store (primarily for tests).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Read a record collection.
    ///
    /// Never fails: a missing key, corrupt JSON or a database error all yield
    /// an empty collection.
    pub async fn read(&self, collection_key: &str) -> Vec<Record> {
        let db = self.db.lock().await;
        read_collection(db.connection(), collection_key)
    }

    /// Replace a whole record collection.
    pub async fn write(&self, collection_key: &str, records: &[Record]) -> Result<()> {
        let db = self.db.lock().await;
        write_value(db.connection(), collection_key, &serde_json::to_string(records)?)
    }

    /// Read-modify-write a collection under the store lock.
    ///
    /// `f` receives the current records and returns the records to persist
    /// plus a value handed back to the caller.
    pub async fn modify<T>(
        &self,
        collection_key: &str,
        f: impl FnOnce(Vec<Record>) -> (Vec<Record>, T),
    ) -> Result<T> {
        let db = self.db.lock().await;
        let conn = db.connection();

        let (records, output) = f(read_collection(conn, collection_key));
        write_value(conn, collection_key, &serde_json::to_string(&records)?)?;
        Ok(output)
    }

    /// Replace the record with the same id, or append it.
    pub async fn upsert(&self, collection_key: &str, record: Record) -> Result<()> {
        self.modify(collection_key, |mut records| {
            match records.iter_mut().find(|existing| existing.id == record.id) {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
            (records, ())
        })
        .await
    }

    /// Look up a single record by id.
    pub async fn find(&self, collection_key: &str, id: &RecordId) -> Option<Record> {
        self.read(collection_key)
            .await
            .into_iter()
            .find(|record| &record.id == id)
    }

    /// Remove a record by id. Returns whether it was present.
    pub async fn remove_record(&self, collection_key: &str, id: &RecordId) -> Result<bool> {
        self.modify(collection_key, |mut records| {
            let before = records.len();
            records.retain(|record| &record.id != id);
            let removed = records.len() != before;
            (records, removed)
        })
        .await
    }

    /// Read a raw string value.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock().await;
        read_value(db.connection(), key)
    }

    /// Write a raw string value.
    pub async fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let db = self.db.lock().await;
        write_value(db.connection(), key, value)
    }

    /// Append last-write-wins decisions to the conflict log.
    ///
    /// A decision already logged for the same record and timestamp pair is
    /// skipped, so re-merging an unsynced edit does not grow the log.
    /// Returns how many rows were added.
    pub async fn record_conflicts(&self, conflicts: &[SyncConflict]) -> Result<usize> {
        if conflicts.is_empty() {
            return Ok(0);
        }

        let db = self.db.lock().await;
        let tx = db.connection().unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO sync_conflicts (
                    entity_type, record_id, local_modified, remote_modified,
                    winner, strategy, resolved_at
                )
                SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7
                WHERE NOT EXISTS (
                    SELECT 1 FROM sync_conflicts
                    WHERE entity_type = ?1 AND record_id = ?2
                      AND local_modified = ?3 AND remote_modified = ?4
                )",
            )?;
            for conflict in conflicts {
                inserted += stmt.execute(params![
                    conflict.entity_type.as_str(),
                    conflict.record_id.as_str(),
                    conflict.local_modified,
                    conflict.remote_modified,
                    conflict.winner.as_str(),
                    conflict.strategy,
                    conflict.resolved_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// List recently logged conflicts, newest first.
    pub async fn list_conflicts(&self, limit: usize) -> Result<Vec<SyncConflict>> {
        let db = self.db.lock().await;
        let mut stmt = db.connection().prepare(
            "SELECT id, entity_type, record_id, local_modified, remote_modified,
                    winner, strategy, resolved_at
             FROM sync_conflicts
             ORDER BY resolved_at DESC, id DESC
             LIMIT ?",
        )?;

        let rows = stmt
            .query_map(params![i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
                Ok(ConflictRow {
                    id: row.get(0)?,
                    entity_type: row.get(1)?,
                    record_id: row.get(2)?,
                    local_modified: row.get(3)?,
                    remote_modified: row.get(4)?,
                    winner: row.get(5)?,
                    strategy: row.get(6)?,
                    resolved_at: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(ConflictRow::into_conflict).collect()
    }
}

struct ConflictRow {
    id: i64,
    entity_type: String,
    record_id: String,
    local_modified: DateTime<Utc>,
    remote_modified: DateTime<Utc>,
    winner: String,
    strategy: String,
    resolved_at: DateTime<Utc>,
}

impl ConflictRow {
    fn into_conflict(self) -> Result<SyncConflict> {
        let winner = match self.winner.as_str() {
            "local" => ConflictWinner::Local,
            "remote" => ConflictWinner::Remote,
            other => {
                return Err(Error::InvalidInput(format!(
                    "unknown conflict winner '{other}'"
                )))
            }
        };

        Ok(SyncConflict {
            id: self.id,
            entity_type: self.entity_type.parse()?,
            record_id: self.record_id.parse()?,
            local_modified: self.local_modified,
            remote_modified: self.remote_modified,
            winner,
            strategy: self.strategy,
            resolved_at: self.resolved_at,
        })
    }
}

fn read_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

fn write_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, Utc::now().timestamp_millis()],
    )?;
    Ok(())
}

fn read_collection(conn: &Connection, key: &str) -> Vec<Record> {
    let raw = match read_value(conn, key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(error) => {
            tracing::warn!(key, %error, "Failed to read local collection; treating as empty");
            return Vec::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|error| {
        tracing::warn!(key, %error, "Corrupt local collection; treating as empty");
        Vec::new()
    })
}
