//! Typed per-entity access on top of the engine.

use std::marker::PhantomData;

use crate::error::Result;
use crate::models::{Entity, Record, RecordId};
use crate::remote::RemoteStore;
use crate::services::SyncEngine;

/// Save/load/delete for one entity kind, with payload validation.
pub struct EntityFacade<'a, E, R> {
    engine: &'a SyncEngine<R>,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: Entity, R: RemoteStore> EntityFacade<'a, E, R> {
    pub(crate) const fn new(engine: &'a SyncEngine<R>) -> Self {
        Self {
            engine,
            _entity: PhantomData,
        }
    }

    /// Validate and save a payload. `id = None` creates a new record.
    pub async fn save(&self, payload: E, id: Option<RecordId>) -> Result<Record<E>> {
        payload.validate()?;
        let saved = self
            .engine
            .save_record(E::KIND, serde_json::to_value(&payload)?, id)
            .await?;

        Ok(Record {
            id: saved.id,
            payload,
            created_at: saved.created_at,
            created_by: saved.created_by,
            last_modified: saved.last_modified,
        })
    }

    /// Load the collection. Records whose payload does not decode are
    /// skipped with a warning.
    pub async fn load(&self) -> Result<Vec<Record<E>>> {
        let records = self.engine.load_records(E::KIND).await?;
        Ok(records
            .iter()
            .filter_map(|record| match record.decode::<E>() {
                Ok(typed) => Some(typed),
                Err(error) => {
                    tracing::warn!(
                        entity = %E::KIND,
                        record = %record.id,
                        %error,
                        "Skipping record with undecodable payload"
                    );
                    None
                }
            })
            .collect())
    }

    /// Local lookup by id, without touching the remote.
    pub async fn get(&self, id: &RecordId) -> Result<Option<Record<E>>> {
        self.engine
            .store()
            .find(E::KIND.collection_key(), id)
            .await
            .map(|record| record.decode())
            .transpose()
    }

    pub async fn delete(&self, id: &RecordId) -> Result<bool> {
        self.engine.delete_record(E::KIND, id).await
    }
}
