//! Platform locations for the config file and local database.

use std::path::PathBuf;

use crate::error::CliError;

const APP_DIR: &str = "clubsync";
const CONFIG_FILE_NAME: &str = "cli-config.json";
const DB_FILE_NAME: &str = "clubsync.db";

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("could not resolve a config directory".to_string()))
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join(DB_FILE_NAME))
        .ok_or_else(|| CliError::Config("could not resolve a data directory".to_string()))
}
