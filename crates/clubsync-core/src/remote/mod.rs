//! Remote API access.
//!
//! Every call reports failure as "unavailable" (`false` / `None`) instead of
//! an error. Retrying is the sync queue's job, not the client's.

mod http;

pub use http::HttpRemoteStore;

use crate::models::{EntityKind, Record, RecordId};

/// CRUD access to the remote collection of each entity kind
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Create a record remotely
    async fn create(&self, kind: EntityKind, record: &Record) -> bool;

    /// Update an existing remote record
    async fn update(&self, kind: EntityKind, record: &Record) -> bool;

    /// List every remote record of a kind
    async fn list(&self, kind: EntityKind) -> Option<Vec<Record>>;

    /// Delete a remote record
    async fn delete(&self, kind: EntityKind, id: &RecordId) -> bool;

    /// Cheap reachability probe
    async fn ping(&self) -> bool;
}

/// `None` is a remote that is never reachable (local-only mode).
impl<R: RemoteStore> RemoteStore for Option<R> {
    async fn create(&self, kind: EntityKind, record: &Record) -> bool {
        match self {
            Some(remote) => remote.create(kind, record).await,
            None => false,
        }
    }

    async fn update(&self, kind: EntityKind, record: &Record) -> bool {
        match self {
            Some(remote) => remote.update(kind, record).await,
            None => false,
        }
    }

    async fn list(&self, kind: EntityKind) -> Option<Vec<Record>> {
        match self {
            Some(remote) => remote.list(kind).await,
            None => None,
        }
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> bool {
        match self {
            Some(remote) => remote.delete(kind, id).await,
            None => false,
        }
    }

    async fn ping(&self) -> bool {
        match self {
            Some(remote) => remote.ping().await,
            None => false,
        }
    }
}
