//! Typed payloads for each entity kind

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use crate::error::{Error, Result};

fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

/// A trip posted for travel matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_travelers: Option<u32>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl Entity for Trip {
    const KIND: EntityKind = EntityKind::Trip;

    fn validate(&self) -> Result<()> {
        require_text(&self.destination, "destination")?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(Error::InvalidInput(
                    "endDate must not be before startDate".into(),
                ));
            }
        }
        if self.max_travelers == Some(0) {
            return Err(Error::InvalidInput("maxTravelers must be at least 1".into()));
        }
        Ok(())
    }
}

/// What a group gathers around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupCategory {
    #[default]
    Study,
    Workout,
    Innovation,
    Social,
}

/// A study, workout, innovation or friend group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub category: GroupCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_members: Option<u32>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Entity for Group {
    const KIND: EntityKind = EntityKind::Group;

    fn validate(&self) -> Result<()> {
        require_text(&self.name, "name")?;
        if let Some(max) = self.max_members {
            if self.members.len() > max as usize {
                return Err(Error::InvalidInput(format!(
                    "group has {} members but maxMembers is {max}",
                    self.members.len()
                )));
            }
        }
        Ok(())
    }
}

/// A member profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl Entity for Profile {
    const KIND: EntityKind = EntityKind::Profile;

    fn validate(&self) -> Result<()> {
        require_text(&self.display_name, "displayName")?;
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(Error::InvalidInput(format!("invalid email '{email}'")));
            }
        }
        Ok(())
    }
}

/// A chat message inside a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub body: String,
}

impl Entity for Message {
    const KIND: EntityKind = EntityKind::Message;

    fn validate(&self) -> Result<()> {
        require_text(&self.conversation_id, "conversationId")?;
        require_text(&self.body, "body")
    }
}
