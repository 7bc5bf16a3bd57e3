//! Entity kinds and the descriptor each one carries

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payloads::{Group, Message, Profile, Trip};
use crate::error::{Error, Result};

/// The record collections kept in sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Trip,
    Group,
    Profile,
    Message,
}

impl EntityKind {
    pub const ALL: [Self; 4] = [Self::Trip, Self::Group, Self::Profile, Self::Message];

    /// Local store key holding this kind's collection
    pub const fn collection_key(self) -> &'static str {
        match self {
            Self::Trip => "trips",
            Self::Group => "groups",
            Self::Profile => "profiles",
            Self::Message => "messages",
        }
    }

    /// REST collection path, relative to the API base URL
    pub const fn remote_path(self) -> &'static str {
        match self {
            Self::Trip => "/api/trips",
            Self::Group => "/api/groups",
            Self::Profile => "/api/profiles",
            Self::Message => "/api/messages",
        }
    }

    /// Only trips and groups can be deleted
    pub const fn supports_delete(self) -> bool {
        matches!(self, Self::Trip | Self::Group)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trip => "trip",
            Self::Group => "group",
            Self::Profile => "profile",
            Self::Message => "message",
        }
    }

    /// Decode and validate an untyped payload as this kind's payload type
    pub fn validate_payload(self, payload: &Value) -> Result<()> {
        match self {
            Self::Trip => decode_and_validate::<Trip>(payload),
            Self::Group => decode_and_validate::<Group>(payload),
            Self::Profile => decode_and_validate::<Profile>(payload),
            Self::Message => decode_and_validate::<Message>(payload),
        }
    }
}

fn decode_and_validate<E: Entity>(payload: &Value) -> Result<()> {
    E::deserialize(payload)
        .map_err(|error| Error::InvalidInput(format!("invalid {} payload: {error}", E::KIND)))?
        .validate()
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trip" | "trips" => Ok(Self::Trip),
            "group" | "groups" => Ok(Self::Group),
            "profile" | "profiles" => Ok(Self::Profile),
            "message" | "messages" => Ok(Self::Message),
            other => Err(Error::InvalidInput(format!("unknown entity kind '{other}'"))),
        }
    }
}

/// A typed payload bound to one entity kind.
///
/// `validate` runs at the facade boundary before anything is written.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KIND: EntityKind;

    fn validate(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kinds_parse_singular_and_plural() {
        assert_eq!("trips".parse::<EntityKind>().unwrap(), EntityKind::Trip);
        assert_eq!(" Group ".parse::<EntityKind>().unwrap(), EntityKind::Group);
        assert!("workouts".parse::<EntityKind>().is_err());
    }

    #[test]
    fn collection_keys_are_distinct() {
        let mut keys = EntityKind::ALL
            .iter()
            .map(|kind| kind.collection_key())
            .collect::<Vec<_>>();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), EntityKind::ALL.len());
    }

    #[test]
    fn only_trips_and_groups_support_delete() {
        assert!(EntityKind::Trip.supports_delete());
        assert!(EntityKind::Group.supports_delete());
        assert!(!EntityKind::Profile.supports_delete());
        assert!(!EntityKind::Message.supports_delete());
    }

    #[test]
    fn validate_payload_uses_kind_specific_schema() {
        let trip = json!({ "destination": "Porto" });
        assert!(EntityKind::Trip.validate_payload(&trip).is_ok());
        let error = EntityKind::Message.validate_payload(&trip).unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
        assert!(error.to_string().contains("conversationId"));
    }
}
