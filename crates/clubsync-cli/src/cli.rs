use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clubsync_core::EntityKind;

#[derive(Parser)]
#[command(name = "clubsync")]
#[command(about = "Local-first sync client for the club mini-apps")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the CLI config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Club API base URL (overrides config and CLUBSYNC_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Skip the startup connectivity probe and work offline
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a record (creates when no --id is given)
    Save {
        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,
        /// Payload as JSON (read from stdin when omitted)
        payload: Option<String>,
        /// Existing record id to update
        #[arg(long)]
        id: Option<String>,
    },
    /// List records, merging with the remote when online
    List {
        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a trip or group
    Delete {
        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,
        /// Record id
        id: String,
    },
    /// Show operations waiting to be synced
    Queue {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay the sync queue against the remote API
    Sync {
        #[command(subcommand)]
        command: Option<SyncCommands>,
    },
    /// Print the local user identity and connectivity
    Whoami,
    /// Inspect or update the CLI config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindArg {
    Trip,
    Group,
    Profile,
    Message,
}

impl From<KindArg> for EntityKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Trip => Self::Trip,
            KindArg::Group => Self::Group,
            KindArg::Profile => Self::Profile,
            KindArg::Message => Self::Message,
        }
    }
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// List recently resolved sync conflicts
    Conflicts {
        /// Number of conflicts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Update the config file
    Set {
        /// Club API base URL
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Fixed user id instead of the generated one
        #[arg(long, value_name = "ID")]
        user_id: Option<String>,
        /// Per-request timeout in seconds (0 clears it)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
}
