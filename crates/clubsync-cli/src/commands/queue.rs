use crate::commands::common::{format_queue_lines, queue_entry_to_item, Engine, QueueItem};
use crate::error::CliError;

pub async fn run_queue(engine: &Engine, as_json: bool) -> Result<(), CliError> {
    let entries = engine.queue().snapshot().await;

    if as_json {
        let items = entries
            .iter()
            .map(queue_entry_to_item)
            .collect::<Vec<QueueItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if entries.is_empty() {
        println!("Sync queue is empty.");
    } else {
        for line in format_queue_lines(&entries) {
            println!("{line}");
        }
    }

    Ok(())
}
