//! Durable queue of mutations waiting for remote confirmation.

use std::future::Future;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::db::{LocalStore, QUEUE_KEY};
use crate::error::Result;
use crate::models::{EntityKind, Operation, Record, RecordId, SyncQueueEntry};

/// Why a drain did not run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Offline,
    AlreadyDraining,
}

/// Result of one drain pass
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Entries confirmed by the remote and removed
    pub replayed: usize,
    /// Entries that failed and moved to the tail
    pub requeued: usize,
    /// Entries left in the queue after the pass
    pub remaining: usize,
    pub skipped: Option<SkipReason>,
}

impl DrainReport {
    pub const fn skipped(reason: SkipReason, remaining: usize) -> Self {
        Self {
            replayed: 0,
            requeued: 0,
            remaining,
            skipped: Some(reason),
        }
    }
}

/// In-memory queue mirrored to the local store after every mutation.
///
/// Entries are appended at the tail and replayed from the head. A failed
/// replay moves its entry to the tail, so retry order can differ from
/// enqueue order. There is no size cap and no retry limit.
pub struct SyncQueue {
    store: LocalStore,
    entries: Mutex<Vec<SyncQueueEntry>>,
    drain_lock: Mutex<()>,
}

impl SyncQueue {
    /// Load the persisted queue. Corrupt data yields an empty queue.
    pub async fn load(store: LocalStore) -> Self {
        let entries = match store.get_raw(QUEUE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                tracing::warn!(%error, "Corrupt sync queue in local store; starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(%error, "Failed to read sync queue; starting empty");
                Vec::new()
            }
        };

        if !entries.is_empty() {
            tracing::info!(pending = entries.len(), "Loaded pending sync queue");
        }

        Self {
            store,
            entries: Mutex::new(entries),
            drain_lock: Mutex::new(()),
        }
    }

    /// Append an entry and persist the queue immediately.
    pub async fn enqueue(
        &self,
        entity_type: EntityKind,
        operation: Operation,
        payload: Record,
    ) -> Result<SyncQueueEntry> {
        let entry = SyncQueueEntry::new(entity_type, operation, payload);
        let mut entries = self.entries.lock().await;
        entries.push(entry.clone());
        self.persist(&entries).await?;

        tracing::debug!(
            entity = %entity_type,
            operation = operation.as_str(),
            record = %entry.payload.id,
            pending = entries.len(),
            "Queued operation for later sync"
        );
        Ok(entry)
    }

    /// Copy of the live queue, head first.
    pub async fn snapshot(&self) -> Vec<SyncQueueEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Drop every pending entry for a record. Returns how many were dropped.
    pub async fn discard_record(&self, entity_type: EntityKind, id: &RecordId) -> Result<usize> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|entry| !(entry.entity_type == entity_type && &entry.payload.id == id));
        let discarded = before - entries.len();
        if discarded > 0 {
            self.persist(&entries).await?;
        }
        Ok(discarded)
    }

    /// Replay a snapshot of the queue through `replay`.
    ///
    /// Entries enqueued while the pass runs are not part of it. Successful
    /// entries are removed; failed ones go to the tail with `attempts`
    /// incremented. The live queue is persisted once the pass ends. A drain
    /// requested while another is running is skipped.
    pub async fn drain<F, Fut>(&self, mut replay: F) -> Result<DrainReport>
    where
        F: FnMut(SyncQueueEntry) -> Fut,
        Fut: Future<Output = bool>,
    {
        let Ok(_draining) = self.drain_lock.try_lock() else {
            return Ok(DrainReport::skipped(
                SkipReason::AlreadyDraining,
                self.len().await,
            ));
        };

        let snapshot = self.snapshot().await;
        let mut report = DrainReport::default();

        for entry in snapshot {
            let entry_id = entry.entry_id;
            let confirmed = replay(entry).await;

            let mut entries = self.entries.lock().await;
            let Some(position) = entries.iter().position(|e| e.entry_id == entry_id) else {
                // discarded while the replay was in flight
                continue;
            };
            let mut entry = entries.remove(position);

            if confirmed {
                report.replayed += 1;
            } else {
                entry.attempts += 1;
                tracing::warn!(
                    entity = %entry.entity_type,
                    record = %entry.payload.id,
                    attempts = entry.attempts,
                    "Replay failed; moved entry to tail of sync queue"
                );
                entries.push(entry);
                report.requeued += 1;
            }
        }

        let entries = self.entries.lock().await;
        self.persist(&entries).await?;
        report.remaining = entries.len();

        tracing::info!(
            replayed = report.replayed,
            requeued = report.requeued,
            remaining = report.remaining,
            "Sync queue drained"
        );
        Ok(report)
    }

    async fn persist(&self, entries: &[SyncQueueEntry]) -> Result<()> {
        self.store
            .set_raw(QUEUE_KEY, &serde_json::to_string(entries)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(id: &str) -> Record {
        Record {
            id: id.parse().unwrap(),
            payload: json!({ "destination": id }),
            created_at: Utc::now(),
            created_by: "user-1".to_string(),
            last_modified: Some(Utc::now()),
        }
    }

    async fn queue_with(ids: &[&str]) -> SyncQueue {
        let queue = SyncQueue::load(LocalStore::open_in_memory().unwrap()).await;
        for id in ids {
            queue
                .enqueue(EntityKind::Trip, Operation::Create, record(id))
                .await
                .unwrap();
        }
        queue
    }

    fn pending_ids(entries: &[SyncQueueEntry]) -> Vec<String> {
        entries.iter().map(|e| e.payload.id.to_string()).collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn enqueued_entries_survive_reload() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("clubsync.db");
        {
            let queue = SyncQueue::load(LocalStore::open(&path).unwrap()).await;
            queue
                .enqueue(EntityKind::Group, Operation::Update, record("g1"))
                .await
                .unwrap();
        }

        let reloaded = SyncQueue::load(LocalStore::open(&path).unwrap()).await;
        let entries = reloaded.snapshot().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_type, EntityKind::Group);
        assert_eq!(entries[0].operation, Operation::Update);
        assert_eq!(entries[0].payload.id.as_str(), "g1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn corrupt_queue_loads_empty() {
        let store = LocalStore::open_in_memory().unwrap();
        store.set_raw(QUEUE_KEY, "[{oops").await.unwrap();

        let queue = SyncQueue::load(store).await;
        assert!(queue.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drain_keeps_only_failed_entries() {
        let queue = queue_with(&["e1", "e2", "e3"]).await;

        let report = queue
            .drain(|entry| async move { entry.payload.id.as_str() != "e2" })
            .await
            .unwrap();

        assert_eq!(report.replayed, 2);
        assert_eq!(report.requeued, 1);
        assert_eq!(report.remaining, 1);
        let remaining = queue.snapshot().await;
        assert_eq!(pending_ids(&remaining), vec!["e2"]);
        assert_eq!(remaining[0].attempts, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_entries_move_to_tail() {
        let queue = queue_with(&["e1", "e2", "e3"]).await;

        queue
            .drain(|entry| async move { entry.payload.id.as_str() == "e2" })
            .await
            .unwrap();

        assert_eq!(pending_ids(&queue.snapshot().await), vec!["e1", "e3"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drain_result_is_persisted() {
        let store = LocalStore::open_in_memory().unwrap();
        let queue = SyncQueue::load(store.clone()).await;
        for id in ["a", "b"] {
            queue
                .enqueue(EntityKind::Trip, Operation::Create, record(id))
                .await
                .unwrap();
        }

        queue
            .drain(|entry| async move { entry.payload.id.as_str() == "a" })
            .await
            .unwrap();

        let reloaded = SyncQueue::load(store).await;
        assert_eq!(pending_ids(&reloaded.snapshot().await), vec!["b"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn entries_added_during_drain_wait_for_next_pass() {
        let queue = queue_with(&["first"]).await;
        let live = &queue;

        let report = queue
            .drain(move |_entry| async move {
                live.enqueue(EntityKind::Trip, Operation::Update, record("late"))
                    .await
                    .unwrap();
                true
            })
            .await
            .unwrap();

        assert_eq!(report.replayed, 1);
        assert_eq!(pending_ids(&queue.snapshot().await), vec!["late"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn discard_record_drops_matching_entries() {
        let queue = queue_with(&["a", "b", "a"]).await;

        let dropped = queue
            .discard_record(EntityKind::Trip, &"a".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(dropped, 2);
        assert_eq!(pending_ids(&queue.snapshot().await), vec!["b"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_drain_is_skipped() {
        let queue = queue_with(&["a"]).await;
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let mut release_rx = Some(release_rx);

        let first = queue.drain(|_entry| {
            let rx = release_rx.take();
            async move {
                if let Some(rx) = rx {
                    rx.await.ok();
                }
                true
            }
        });
        let second = async {
            tokio::task::yield_now().await;
            let report = queue.drain(|_entry| async { true }).await.unwrap();
            release_tx.send(()).ok();
            report
        };

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first.unwrap().replayed, 1);
        assert_eq!(second.skipped, Some(SkipReason::AlreadyDraining));
    }
}
