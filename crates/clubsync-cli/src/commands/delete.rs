use clubsync_core::EntityKind;

use crate::commands::common::{parse_record_id, Engine};
use crate::error::CliError;

pub async fn run_delete(engine: &Engine, kind: EntityKind, id: &str) -> Result<(), CliError> {
    let record_id = parse_record_id(id)?;
    if !engine.delete_record(kind, &record_id).await? {
        return Err(CliError::RecordNotFound(record_id.to_string()));
    }

    println!("Deleted {kind} {record_id}");
    Ok(())
}
