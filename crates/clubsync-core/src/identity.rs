//! Local user identity used to stamp `createdBy`.

use std::fmt;

use uuid::Uuid;

use crate::db::{LocalStore, IDENTITY_KEY};
use crate::error::Result;
use crate::util::normalize_text_option;

/// Opaque per-installation user identifier. Not used for access control.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIdentity(String);

impl UserIdentity {
    /// Load the persisted identity, generating and persisting one if absent.
    ///
    /// A non-empty `override_id` wins and is persisted in place of any
    /// existing value.
    pub async fn load_or_create(store: &LocalStore, override_id: Option<String>) -> Result<Self> {
        if let Some(id) = normalize_text_option(override_id) {
            store.set_raw(IDENTITY_KEY, &id).await?;
            return Ok(Self(id));
        }

        if let Some(id) = normalize_text_option(store.get_raw(IDENTITY_KEY).await?) {
            return Ok(Self(id));
        }

        let id = format!("user-{}", Uuid::now_v7());
        store.set_raw(IDENTITY_KEY, &id).await?;
        tracing::info!(user_id = %id, "Generated local user identity");
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
