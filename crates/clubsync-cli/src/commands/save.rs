use clubsync_core::EntityKind;

use crate::commands::common::{parse_record_id, resolve_payload, Engine};
use crate::error::CliError;

pub async fn run_save(
    engine: &Engine,
    kind: EntityKind,
    payload: Option<String>,
    id: Option<String>,
) -> Result<(), CliError> {
    let payload = resolve_payload(payload)?;
    let id = id.as_deref().map(parse_record_id).transpose()?;

    let record = engine.save_record(kind, payload, id).await?;
    let pending = engine
        .queue()
        .snapshot()
        .await
        .iter()
        .any(|entry| entry.entity_type == kind && entry.payload.id == record.id);

    println!("{}", record.id);
    if pending {
        eprintln!("Saved locally; queued for sync.");
    }
    Ok(())
}
