use clubsync_core::sync::{DrainReport, SkipReason};

use crate::commands::common::{
    format_sync_conflict_lines, sync_conflict_to_item, Engine, SyncConflictItem,
};
use crate::error::CliError;

pub async fn run_sync(engine: &Engine) -> Result<(), CliError> {
    if engine.remote().is_none() {
        return Err(CliError::SyncNotConfigured);
    }

    let report = engine.drain_queue().await?;
    check_report(&report)?;
    println!("{}", format_drain_report(&report));
    Ok(())
}

pub async fn run_sync_conflicts(
    engine: &Engine,
    limit: usize,
    as_json: bool,
) -> Result<(), CliError> {
    let conflicts = engine.store().list_conflicts(limit).await?;

    if as_json {
        let items = conflicts
            .iter()
            .map(sync_conflict_to_item)
            .collect::<Vec<SyncConflictItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if conflicts.is_empty() {
        println!("No sync conflicts recorded.");
    } else {
        for line in format_sync_conflict_lines(&conflicts) {
            println!("{line}");
        }
    }

    Ok(())
}

pub const fn check_report(report: &DrainReport) -> Result<(), CliError> {
    match report.skipped {
        Some(SkipReason::Offline) => Err(CliError::Offline(report.remaining)),
        Some(SkipReason::AlreadyDraining) => Err(CliError::AlreadyDraining),
        None => Ok(()),
    }
}

pub fn format_drain_report(report: &DrainReport) -> String {
    format!(
        "Sync complete: {} replayed, {} requeued, {} remaining",
        report.replayed, report.requeued, report.remaining
    )
}
