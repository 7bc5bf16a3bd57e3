use std::path::Path;

use clubsync_core::config::ClientConfig;

use crate::error::CliError;

pub fn run_config_show(config: &ClientConfig, config_path: &Path) -> Result<(), CliError> {
    println!("Config file: {}", config_path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

pub fn run_config_set(
    config_path: &Path,
    api_url: Option<String>,
    user_id: Option<String>,
    timeout: Option<u64>,
) -> Result<(), CliError> {
    let mut config = ClientConfig::load_from_path(config_path)?;
    apply_config_updates(&mut config, api_url, user_id, timeout)?;
    config.save_to_path(config_path)?;
    println!("Updated {}", config_path.display());
    Ok(())
}

/// Apply `config set` flags. Empty strings clear a value; 0 clears the timeout.
pub fn apply_config_updates(
    config: &mut ClientConfig,
    api_url: Option<String>,
    user_id: Option<String>,
    timeout: Option<u64>,
) -> Result<(), CliError> {
    if api_url.is_none() && user_id.is_none() && timeout.is_none() {
        return Err(CliError::Config(
            "nothing to update; pass --api-url, --user-id or --timeout".to_string(),
        ));
    }

    if let Some(url) = api_url {
        config.api_base_url = Some(url);
    }
    if let Some(user_id) = user_id {
        config.user_id = Some(user_id);
    }
    if let Some(secs) = timeout {
        config.request_timeout_secs = Some(secs);
    }
    config.normalize();
    config.validate()?;
    Ok(())
}
