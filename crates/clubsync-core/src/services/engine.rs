//! The sync engine: local store, remote client, queue and connectivity
//! composed once and shared by every facade.

use std::future::Future;

use chrono::{TimeDelta, Utc};
use serde_json::Value;

use crate::db::LocalStore;
use crate::error::{Error, Result};
use crate::identity::UserIdentity;
use crate::models::{
    Entity, EntityKind, Group, Message, Operation, Profile, Record, RecordId, SyncQueueEntry,
    Trip,
};
use crate::remote::RemoteStore;
use crate::services::EntityFacade;
use crate::sync::{
    merge_records, Connectivity, ConnectivityMonitor, DrainReport, SkipReason, SyncQueue,
    Transition,
};

/// Local-first sync client.
///
/// Writes always land in the local store. They are confirmed remotely when
/// online, and queued for replay otherwise.
pub struct SyncEngine<R> {
    store: LocalStore,
    remote: R,
    queue: SyncQueue,
    connectivity: ConnectivityMonitor,
    user: UserIdentity,
}

impl<R: RemoteStore> SyncEngine<R> {
    /// Assemble an engine, loading the persisted sync queue.
    pub async fn new(
        store: LocalStore,
        remote: R,
        initial: Connectivity,
        user: UserIdentity,
    ) -> Self {
        let queue = SyncQueue::load(store.clone()).await;
        Self {
            store,
            remote,
            queue,
            connectivity: ConnectivityMonitor::new(initial),
            user,
        }
    }

    /// Assemble an engine, resolving the user identity and probing the
    /// remote once for the initial connectivity state.
    pub async fn start(
        store: LocalStore,
        remote: R,
        user_override: Option<String>,
    ) -> Result<Self> {
        let user = UserIdentity::load_or_create(&store, user_override).await?;
        let initial = Connectivity::from_online(remote.ping().await);
        tracing::info!(
            user = %user,
            connectivity = initial.as_str(),
            "Sync engine started"
        );
        Ok(Self::new(store, remote, initial, user).await)
    }

    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    pub const fn queue(&self) -> &SyncQueue {
        &self.queue
    }

    pub const fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub const fn user(&self) -> &UserIdentity {
        &self.user
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn facade<E: Entity>(&self) -> EntityFacade<'_, E, R> {
        EntityFacade::new(self)
    }

    pub fn trips(&self) -> EntityFacade<'_, Trip, R> {
        self.facade()
    }

    pub fn groups(&self) -> EntityFacade<'_, Group, R> {
        self.facade()
    }

    pub fn profiles(&self) -> EntityFacade<'_, Profile, R> {
        self.facade()
    }

    pub fn messages(&self) -> EntityFacade<'_, Message, R> {
        self.facade()
    }

    /// Save an untyped payload.
    ///
    /// A missing id, or an id unknown to the local store, makes this a
    /// create; otherwise an update that keeps `createdAt`/`createdBy`.
    pub async fn save_record(
        &self,
        kind: EntityKind,
        payload: Value,
        id: Option<RecordId>,
    ) -> Result<Record> {
        kind.validate_payload(&payload)?;

        let key = kind.collection_key();
        let existing = match &id {
            Some(id) => self.store.find(key, id).await,
            None => None,
        };

        let now = Utc::now();
        let (record, operation) = match existing {
            Some(existing) => {
                // never stamp a timestamp at or before the previous one
                let floor = existing.effective_timestamp() + TimeDelta::milliseconds(1);
                let record = Record {
                    id: existing.id,
                    payload,
                    created_at: existing.created_at,
                    created_by: existing.created_by,
                    last_modified: Some(now.max(floor)),
                };
                (record, Operation::Update)
            }
            None => {
                let record = Record {
                    id: id.unwrap_or_else(RecordId::generate),
                    payload,
                    created_at: now,
                    created_by: self.user.to_string(),
                    last_modified: Some(now),
                };
                (record, Operation::Create)
            }
        };

        let confirmed = self.is_online() && self.push(kind, operation, &record).await;
        self.store.upsert(key, record.clone()).await?;
        if !confirmed {
            self.queue.enqueue(kind, operation, record.clone()).await?;
        }

        tracing::debug!(
            entity = %kind,
            record = %record.id,
            operation = operation.as_str(),
            confirmed,
            "Saved record"
        );
        Ok(record)
    }

    /// Load a collection.
    ///
    /// Online, the remote list is merged with local contents and the merge is
    /// persisted. Offline, or when the remote is unavailable, local contents
    /// are returned untouched.
    pub async fn load_records(&self, kind: EntityKind) -> Result<Vec<Record>> {
        let key = kind.collection_key();
        if !self.is_online() {
            return Ok(self.store.read(key).await);
        }

        let Some(remote_records) = self.remote.list(kind).await else {
            tracing::debug!(entity = %kind, "Remote list unavailable; serving local copy");
            return Ok(self.store.read(key).await);
        };

        let (records, conflicts) = self
            .store
            .modify(key, |local| {
                let outcome = merge_records(kind, remote_records, local);
                (outcome.records.clone(), (outcome.records, outcome.conflicts))
            })
            .await?;

        let logged = self.store.record_conflicts(&conflicts).await?;
        if logged > 0 {
            tracing::info!(
                entity = %kind,
                conflicts = logged,
                "Resolved sync conflicts with last-write-wins"
            );
        }
        Ok(records)
    }

    /// Delete a record locally, and remotely when online.
    ///
    /// Remote deletes are best-effort and never queued. Pending queue entries
    /// for the record are dropped so a later replay cannot bring it back.
    pub async fn delete_record(&self, kind: EntityKind, id: &RecordId) -> Result<bool> {
        if !kind.supports_delete() {
            return Err(Error::InvalidInput(format!("{kind} records cannot be deleted")));
        }

        let removed = self.store.remove_record(kind.collection_key(), id).await?;
        let discarded = self.queue.discard_record(kind, id).await?;

        if self.is_online() && !self.remote.delete(kind, id).await {
            tracing::debug!(entity = %kind, record = %id, "Remote delete unavailable");
        }

        tracing::debug!(entity = %kind, record = %id, removed, discarded, "Deleted record");
        Ok(removed)
    }

    /// Replay the sync queue. Skipped while offline.
    pub async fn drain_queue(&self) -> Result<DrainReport> {
        if !self.is_online() {
            return Ok(DrainReport::skipped(
                SkipReason::Offline,
                self.queue.len().await,
            ));
        }

        self.queue.drain(move |entry| self.replay(entry)).await
    }

    /// Feed a platform connectivity signal; drains once on going online.
    pub async fn set_connectivity(&self, status: Connectivity) -> Result<Option<DrainReport>> {
        match self.connectivity.set_status(status) {
            Some(Transition::WentOnline) => Ok(Some(self.drain_queue().await?)),
            _ => Ok(None),
        }
    }

    /// Drain on every offline-to-online edge until `shutdown` resolves.
    ///
    /// For setups where something else flips the monitor directly. Drain
    /// errors are logged and do not stop the loop.
    pub async fn watch_connectivity(&self, shutdown: impl Future<Output = ()>) {
        let mut rx = self.connectivity.subscribe();
        let mut last = *rx.borrow_and_update();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = *rx.borrow_and_update();
                    if last == Connectivity::Offline && current == Connectivity::Online {
                        if let Err(error) = self.drain_queue().await {
                            tracing::warn!(%error, "Sync queue drain failed");
                        }
                    }
                    last = current;
                }
            }
        }
    }

    async fn push(&self, kind: EntityKind, operation: Operation, record: &Record) -> bool {
        match operation {
            Operation::Create => self.remote.create(kind, record).await,
            Operation::Update => self.remote.update(kind, record).await,
        }
    }

    /// Re-enter the remote-write-then-local-write path for a queued entry.
    ///
    /// The queued timestamps are kept. The local copy is only overwritten if
    /// it is not newer than the queued one.
    async fn replay(&self, entry: SyncQueueEntry) -> bool {
        let kind = entry.entity_type;
        let record = entry.payload;

        if let Err(error) = kind.validate_payload(&record.payload) {
            tracing::warn!(
                entity = %kind,
                record = %record.id,
                %error,
                "Queued payload is invalid"
            );
            return false;
        }
        if !self.push(kind, entry.operation, &record).await {
            return false;
        }

        let written = self
            .store
            .modify(kind.collection_key(), |mut records| {
                match records.iter_mut().find(|existing| existing.id == record.id) {
                    Some(existing)
                        if existing.effective_timestamp() > record.effective_timestamp() => {}
                    Some(existing) => *existing = record,
                    None => records.push(record),
                }
                (records, ())
            })
            .await;

        match written {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(entity = %kind, %error, "Failed to write replayed record locally");
                false
            }
        }
    }
}
