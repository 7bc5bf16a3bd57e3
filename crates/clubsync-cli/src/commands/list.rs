use chrono::Utc;
use clubsync_core::EntityKind;

use crate::commands::common::{format_record_lines, Engine};
use crate::error::CliError;

pub async fn run_list(engine: &Engine, kind: EntityKind, as_json: bool) -> Result<(), CliError> {
    let records = engine.load_records(kind).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No {} found.", kind.collection_key());
    } else {
        for line in format_record_lines(kind, &records, Utc::now()) {
            println!("{line}");
        }
    }

    Ok(())
}
