use chrono::{TimeDelta, TimeZone, Utc};
use clap::Parser;
use clubsync_core::config::ClientConfig;
use clubsync_core::db::LocalStore;
use clubsync_core::identity::UserIdentity;
use clubsync_core::models::{Operation, SyncQueueEntry};
use clubsync_core::sync::{Connectivity, DrainReport, SkipReason};
use clubsync_core::{EntityKind, Record, RecordId, SyncEngine};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::cli::{Cli, Commands, ConfigCommands, KindArg, SyncCommands};
use crate::commands::common::{
    apply_cli_overrides, format_queue_lines, format_record_lines, format_relative_time,
    format_sync_timestamp, open_engine, record_summary, resolve_payload, truncate_chars, Engine,
};
use crate::commands::config::{apply_config_updates, run_config_set};
use crate::commands::delete::run_delete;
use crate::commands::sync::{check_report, format_drain_report, run_sync};
use crate::error::CliError;

async fn local_engine() -> Engine {
    let store = LocalStore::open_in_memory().unwrap();
    let user = UserIdentity::load_or_create(&store, Some("user-cli-test".to_string()))
        .await
        .unwrap();
    SyncEngine::new(store, None, Connectivity::Offline, user).await
}

fn sample_record(id: &str, payload: serde_json::Value) -> Record {
    let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    Record {
        id: id.parse().unwrap(),
        payload,
        created_at,
        created_by: "user-a".to_string(),
        last_modified: None,
    }
}

#[test]
fn relative_time_buckets() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    assert_eq!(format_relative_time(now, now), "just now");
    assert_eq!(format_relative_time(now - TimeDelta::minutes(5), now), "5m ago");
    assert_eq!(format_relative_time(now - TimeDelta::hours(3), now), "3h ago");
    assert_eq!(format_relative_time(now - TimeDelta::days(2), now), "2d ago");
    assert_eq!(format_relative_time(now - TimeDelta::days(15), now), "2w ago");
    assert_eq!(format_relative_time(now - TimeDelta::days(400), now), "1y ago");
    // clock skew never renders a negative age
    assert_eq!(format_relative_time(now + TimeDelta::hours(1), now), "just now");
}

#[test]
fn sync_timestamp_is_utc() {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 5).unwrap();
    assert_eq!(format_sync_timestamp(at), "2024-03-01 09:30:05 UTC");
}

#[test]
fn summary_uses_kind_specific_field() {
    assert_eq!(
        record_summary(EntityKind::Trip, &json!({ "destination": "Lisbon" })),
        "Lisbon"
    );
    assert_eq!(
        record_summary(EntityKind::Profile, &json!({ "displayName": "Ana" })),
        "Ana"
    );
    assert_eq!(
        record_summary(EntityKind::Message, &json!({ "body": "see\nyou   there" })),
        "see you there"
    );
    assert_eq!(record_summary(EntityKind::Group, &json!({})), "");
}

#[test]
fn truncation_respects_char_boundaries() {
    assert_eq!(truncate_chars("short", 10), "short");
    assert_eq!(truncate_chars("ñandú ñandú ñandú", 8), "ñandú...");
}

#[test]
fn record_lines_show_summary_and_author() {
    let record = sample_record("trip-1", json!({ "destination": "Porto" }));
    let now = record.created_at + TimeDelta::hours(2);

    let lines = format_record_lines(EntityKind::Trip, &[record], now);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("trip-1 "));
    assert!(lines[0].contains("Porto"));
    assert!(lines[0].contains("2h ago"));
    assert!(lines[0].ends_with("user-a"));
}

#[test]
fn queue_lines_include_operation_and_attempts() {
    let mut entry = SyncQueueEntry::new(
        EntityKind::Group,
        Operation::Update,
        sample_record("group-7", json!({ "name": "Chess" })),
    );
    entry.attempts = 2;

    let lines = format_queue_lines(&[entry]);
    assert!(lines[0].contains("update"));
    assert!(lines[0].contains("group"));
    assert!(lines[0].contains("group-7"));
    assert!(lines[0].ends_with("attempts=2"));
}

#[test]
fn skipped_drains_become_errors() {
    let offline = DrainReport::skipped(SkipReason::Offline, 3);
    assert!(matches!(check_report(&offline), Err(CliError::Offline(3))));

    let busy = DrainReport::skipped(SkipReason::AlreadyDraining, 0);
    assert!(matches!(check_report(&busy), Err(CliError::AlreadyDraining)));

    let done = DrainReport {
        replayed: 2,
        requeued: 1,
        remaining: 1,
        skipped: None,
    };
    assert!(check_report(&done).is_ok());
    assert_eq!(
        format_drain_report(&done),
        "Sync complete: 2 replayed, 1 requeued, 1 remaining"
    );
}

#[test]
fn payload_argument_must_be_json() {
    let value = resolve_payload(Some(r#" { "destination": "Rome" } "#.to_string())).unwrap();
    assert_eq!(value, json!({ "destination": "Rome" }));

    let error = resolve_payload(Some("not json".to_string())).unwrap_err();
    assert!(matches!(error, CliError::Serialization(_)));
}

#[test]
fn parses_save_and_sync_conflicts() {
    let cli = Cli::parse_from([
        "clubsync",
        "--offline",
        "save",
        "trip",
        r#"{"destination":"Oslo"}"#,
        "--id",
        "trip-9",
    ]);
    assert!(cli.offline);
    match cli.command {
        Commands::Save { kind, payload, id } => {
            assert_eq!(kind, KindArg::Trip);
            assert_eq!(EntityKind::from(kind), EntityKind::Trip);
            assert_eq!(payload.as_deref(), Some(r#"{"destination":"Oslo"}"#));
            assert_eq!(id.as_deref(), Some("trip-9"));
        }
        _ => panic!("expected save command"),
    }

    let cli = Cli::parse_from(["clubsync", "sync", "conflicts", "--limit", "5", "--json"]);
    assert!(matches!(
        cli.command,
        Commands::Sync {
            command: Some(SyncCommands::Conflicts { limit: 5, json: true })
        }
    ));
}

#[test]
fn config_commands_parse_without_engine_flags() {
    let cli = Cli::parse_from([
        "clubsync",
        "config",
        "set",
        "--api-url",
        "http://h",
        "--timeout",
        "0",
    ]);
    assert!(!cli.offline);
    assert!(matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommands::Set {
                api_url: Some(_),
                user_id: None,
                timeout: Some(0),
            }
        }
    ));

    let cli = Cli::parse_from(["clubsync", "sync"]);
    assert!(matches!(cli.command, Commands::Sync { command: None }));
}

#[test]
fn cli_flags_override_config() {
    let cli = Cli::parse_from([
        "clubsync",
        "--api-url",
        "https://flag.example.com/",
        "--db-path",
        "/tmp/club.db",
        "queue",
    ]);
    let mut config = ClientConfig {
        api_base_url: Some("https://file.example.com".to_string()),
        ..Default::default()
    };

    apply_cli_overrides(&mut config, &cli);
    config.normalize();

    assert_eq!(config.api_base_url.as_deref(), Some("https://flag.example.com"));
    assert_eq!(config.db_path.as_deref(), Some(std::path::Path::new("/tmp/club.db")));
}

#[test]
fn config_set_updates_and_clears() {
    let mut config = ClientConfig::default();
    assert!(matches!(
        apply_config_updates(&mut config, None, None, None),
        Err(CliError::Config(_))
    ));

    apply_config_updates(
        &mut config,
        Some("http://localhost:8080".to_string()),
        Some("user-fixed".to_string()),
        Some(10),
    )
    .unwrap();
    assert_eq!(config.api_base_url.as_deref(), Some("http://localhost:8080"));
    assert_eq!(config.user_id.as_deref(), Some("user-fixed"));
    assert_eq!(config.request_timeout_secs, Some(10));

    apply_config_updates(&mut config, None, Some(String::new()), Some(0)).unwrap();
    assert_eq!(config.user_id, None);
    assert_eq!(config.request_timeout_secs, None);

    assert!(apply_config_updates(&mut config, Some("ftp://x".to_string()), None, None).is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn local_only_save_is_queued_and_listed() {
    let engine = local_engine().await;

    let record = engine
        .save_record(EntityKind::Trip, json!({ "destination": "Bergen" }), None)
        .await
        .unwrap();
    assert_eq!(record.created_by, "user-cli-test");

    let records = engine.load_records(EntityKind::Trip).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(engine.queue().len().await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_of_unknown_record_reports_not_found() {
    let engine = local_engine().await;
    let error = run_delete(&engine, EntityKind::Group, "missing-id")
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::RecordNotFound(id) if id == "missing-id"));
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_without_remote_is_not_configured() {
    let engine = local_engine().await;
    let error = run_sync(&engine).await.unwrap_err();
    assert!(matches!(error, CliError::SyncNotConfigured));
}

#[tokio::test(flavor = "multi_thread")]
async fn saved_record_keeps_requested_id() {
    let engine = local_engine().await;
    let id: RecordId = "group-fixed".parse().unwrap();
    let record = engine
        .save_record(EntityKind::Group, json!({ "name": "Runners" }), Some(id.clone()))
        .await
        .unwrap();
    assert_eq!(record.id, id);
}

#[test]
fn config_set_writes_normalized_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("clubsync").join("cli-config.json");

    run_config_set(&path, Some("https://api.example.com/".to_string()), None, Some(5)).unwrap();

    let loaded = ClientConfig::load_from_path(&path).unwrap();
    assert_eq!(loaded.api_base_url.as_deref(), Some("https://api.example.com"));
    assert_eq!(loaded.request_timeout_secs, Some(5));
}

#[tokio::test(flavor = "multi_thread")]
async fn offline_engine_opens_file_store_without_probe() {
    let tmp = tempfile::tempdir().unwrap();
    let config = ClientConfig {
        api_base_url: Some("http://127.0.0.1:9".to_string()),
        db_path: Some(tmp.path().join("data").join("clubsync.db")),
        ..Default::default()
    };

    let engine = open_engine(&config, true).await.unwrap();
    assert!(!engine.is_online());
    assert!(engine.remote().is_some());
    assert!(engine.user().as_str().starts_with("user-"));
    assert!(tmp.path().join("data").join("clubsync.db").exists());
}
