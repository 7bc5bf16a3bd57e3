//! Record model shared by every entity kind

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier of a record within its collection.
///
/// Locally generated ids are UUID v7 strings; ids received from the remote API
/// may have any non-empty shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new time-sortable id
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("record id must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

/// A domain record (trip, group, profile, message).
///
/// `last_modified` is the only signal used for conflict resolution; records
/// that never carried one fall back to `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<P = Value> {
    pub id: RecordId,
    pub payload: P,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl<P> Record<P> {
    /// Timestamp compared by last-write-wins
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.last_modified.unwrap_or(self.created_at)
    }
}

impl Record<Value> {
    /// Decode the JSON payload into a typed payload
    pub fn decode<P: DeserializeOwned>(&self) -> Result<Record<P>> {
        Ok(Record {
            id: self.id.clone(),
            payload: P::deserialize(&self.payload)?,
            created_at: self.created_at,
            created_by: self.created_by.clone(),
            last_modified: self.last_modified,
        })
    }
}
