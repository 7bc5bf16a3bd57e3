use std::io::{self, IsTerminal, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use clubsync_core::config::ClientConfig;
use clubsync_core::db::LocalStore;
use clubsync_core::identity::UserIdentity;
use clubsync_core::models::{SyncConflict, SyncQueueEntry};
use clubsync_core::remote::HttpRemoteStore;
use clubsync_core::sync::Connectivity;
use clubsync_core::util::compact_text;
use clubsync_core::{EntityKind, Record, RecordId, SyncEngine};
use serde::Serialize;
use serde_json::Value;

use crate::cli::Cli;
use crate::error::CliError;
use crate::paths::default_db_path;

/// The engine every command runs against; `None` remote means local-only.
pub type Engine = SyncEngine<Option<HttpRemoteStore>>;

const SUMMARY_CHARS: usize = 40;

#[derive(Debug, Serialize)]
pub struct QueueItem {
    pub entry_id: String,
    pub entity_type: String,
    pub operation: String,
    pub record_id: String,
    pub queued_at: String,
    pub attempts: u32,
}

#[derive(Debug, Serialize)]
pub struct SyncConflictItem {
    pub id: i64,
    pub entity_type: String,
    pub record_id: String,
    pub local_modified: String,
    pub remote_modified: String,
    pub winner: String,
    pub strategy: String,
    pub resolved_at: String,
}

/// Resolve the effective config: file, then environment, then flags.
pub fn load_config(config_path: &Path, cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::load_from_path(config_path)?;
    config.apply_env();
    apply_cli_overrides(&mut config, cli);
    config.normalize();
    config.validate()?;
    Ok(config)
}

pub fn apply_cli_overrides(config: &mut ClientConfig, cli: &Cli) {
    if let Some(url) = &cli.api_url {
        config.api_base_url = Some(url.clone());
    }
    if let Some(path) = &cli.db_path {
        config.db_path = Some(path.clone());
    }
}

pub async fn open_engine(config: &ClientConfig, offline: bool) -> Result<Engine, CliError> {
    let db_path = match &config.db_path {
        Some(path) => path.clone(),
        None => default_db_path()?,
    };
    let store = LocalStore::open(&db_path)?;
    let remote = config.build_remote()?;
    tracing::debug!(db = %db_path.display(), remote = remote.is_some(), "Opening sync engine");

    if offline {
        let user = UserIdentity::load_or_create(&store, config.user_id.clone()).await?;
        return Ok(SyncEngine::new(store, remote, Connectivity::Offline, user).await);
    }

    Ok(SyncEngine::start(store, remote, config.user_id.clone()).await?)
}

/// Parse a payload argument, falling back to piped stdin.
pub fn resolve_payload(argument: Option<String>) -> Result<Value, CliError> {
    let raw = match argument.as_deref().and_then(normalize_input) {
        Some(raw) => raw,
        None => read_piped_stdin()?.ok_or(CliError::EmptyPayload)?,
    };
    Ok(serde_json::from_str(&raw)?)
}

pub fn parse_record_id(raw: &str) -> Result<RecordId, CliError> {
    Ok(raw.parse::<RecordId>()?)
}

pub fn normalize_input(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_input(&buffer))
}

/// Short human label for a record payload.
pub fn record_summary(kind: EntityKind, payload: &Value) -> String {
    let field = match kind {
        EntityKind::Trip => "destination",
        EntityKind::Group => "name",
        EntityKind::Profile => "displayName",
        EntityKind::Message => "body",
    };
    let text = payload
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default();
    truncate_chars(&compact_text(text), SUMMARY_CHARS)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text
        .chars()
        .take(max_chars.saturating_sub(3))
        .collect::<String>();
    truncated.push_str("...");
    truncated
}

pub fn short_id(id: &str) -> String {
    id.chars().take(13).collect()
}

pub fn format_record_lines(
    kind: EntityKind,
    records: &[Record],
    now: DateTime<Utc>,
) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let id = short_id(record.id.as_str());
            let summary = record_summary(kind, &record.payload);
            let relative_time = format_relative_time(record.effective_timestamp(), now);
            format!("{id:<13}  {summary:<40}  {relative_time:<10}  {}", record.created_by)
        })
        .collect()
}

pub fn queue_entry_to_item(entry: &SyncQueueEntry) -> QueueItem {
    QueueItem {
        entry_id: entry.entry_id.to_string(),
        entity_type: entry.entity_type.to_string(),
        operation: entry.operation.as_str().to_string(),
        record_id: entry.payload.id.to_string(),
        queued_at: entry.queued_at.to_rfc3339(),
        attempts: entry.attempts,
    }
}

pub fn format_queue_lines(entries: &[SyncQueueEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{}  {:<6}  {:<8}  {:<13}  attempts={}",
                format_sync_timestamp(entry.queued_at),
                entry.operation.as_str(),
                entry.entity_type.as_str(),
                short_id(entry.payload.id.as_str()),
                entry.attempts
            )
        })
        .collect()
}

pub fn sync_conflict_to_item(conflict: &SyncConflict) -> SyncConflictItem {
    SyncConflictItem {
        id: conflict.id,
        entity_type: conflict.entity_type.to_string(),
        record_id: conflict.record_id.to_string(),
        local_modified: conflict.local_modified.to_rfc3339(),
        remote_modified: conflict.remote_modified.to_rfc3339(),
        winner: conflict.winner.as_str().to_string(),
        strategy: conflict.strategy.clone(),
        resolved_at: conflict.resolved_at.to_rfc3339(),
    }
}

pub fn format_sync_conflict_lines(conflicts: &[SyncConflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            format!(
                "{}  {:<8}  {:<13}  winner={}  strategy={}",
                format_sync_timestamp(conflict.resolved_at),
                conflict.entity_type.as_str(),
                short_id(conflict.record_id.as_str()),
                conflict.winner.as_str(),
                conflict.strategy
            )
        })
        .collect()
}

pub fn format_sync_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_milliseconds().max(0);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
