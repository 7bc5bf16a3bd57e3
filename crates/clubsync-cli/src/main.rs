//! clubsync CLI - drive the local-first sync client from a terminal.

mod cli;
mod commands;
mod error;
mod paths;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands, ConfigCommands, SyncCommands};
use crate::commands::common::{load_config, open_engine};
use crate::commands::config::{run_config_set, run_config_show};
use crate::commands::delete::run_delete;
use crate::commands::list::run_list;
use crate::commands::queue::run_queue;
use crate::commands::save::run_save;
use crate::commands::sync::{run_sync, run_sync_conflicts};
use crate::commands::whoami::run_whoami;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("clubsync=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => paths::default_config_path()?,
    };
    let config = load_config(&config_path, &cli)?;

    let offline = cli.offline;
    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Show => run_config_show(&config, &config_path)?,
            ConfigCommands::Set {
                api_url,
                user_id,
                timeout,
            } => run_config_set(&config_path, api_url, user_id, timeout)?,
        },
        Commands::Save { kind, payload, id } => {
            let engine = open_engine(&config, offline).await?;
            run_save(&engine, kind.into(), payload, id).await?;
        }
        Commands::List { kind, json } => {
            let engine = open_engine(&config, offline).await?;
            run_list(&engine, kind.into(), json).await?;
        }
        Commands::Delete { kind, id } => {
            let engine = open_engine(&config, offline).await?;
            run_delete(&engine, kind.into(), &id).await?;
        }
        Commands::Queue { json } => {
            let engine = open_engine(&config, offline).await?;
            run_queue(&engine, json).await?;
        }
        Commands::Sync { command } => {
            let engine = open_engine(&config, offline).await?;
            match command {
                None => run_sync(&engine).await?,
                Some(SyncCommands::Conflicts { limit, json }) => {
                    run_sync_conflicts(&engine, limit, json).await?;
                }
            }
        }
        Commands::Whoami => {
            let engine = open_engine(&config, offline).await?;
            run_whoami(&engine);
        }
    }

    Ok(())
}
