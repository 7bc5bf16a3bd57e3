//! Client configuration shared by every front end.
//!
//! Values come from a JSON file, then environment variables, then whatever
//! the caller overrides (CLI flags). Text values are normalized: surrounding
//! whitespace is trimmed and empty strings mean "unset".

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::remote::HttpRemoteStore;
use crate::util::{is_http_url, normalize_text_option};

pub const ENV_API_URL: &str = "CLUBSYNC_API_URL";
pub const ENV_DB_PATH: &str = "CLUBSYNC_DB_PATH";
pub const ENV_USER_ID: &str = "CLUBSYNC_USER_ID";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the club REST API; unset means local-only
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// Overrides the generated local user identity
    #[serde(default)]
    pub user_id: Option<String>,
    /// Per-request timeout; unset leaves the HTTP client's default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Load from a JSON file. A missing file yields the default config.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::Config(format!("failed to parse {}: {error}", path.display()))
        })?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup (testable form of `apply_env`).
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = normalize_text_option(lookup(ENV_API_URL)) {
            self.api_base_url = Some(url);
        }
        if let Some(path) = normalize_text_option(lookup(ENV_DB_PATH)) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(user_id) = normalize_text_option(lookup(ENV_USER_ID)) {
            self.user_id = Some(user_id);
        }
    }

    pub fn normalize(&mut self) {
        self.api_base_url = normalize_text_option(self.api_base_url.take())
            .map(|url| url.trim_end_matches('/').to_string());
        self.user_id = normalize_text_option(self.user_id.take());
        self.db_path = self
            .db_path
            .take()
            .filter(|path| !path.as_os_str().is_empty());
        self.request_timeout_secs = self.request_timeout_secs.filter(|secs| *secs > 0);
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.api_base_url {
            if !is_http_url(url) {
                return Err(Error::Config(format!(
                    "api_base_url '{url}' must include http:// or https://"
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Build the HTTP remote, or `None` when no API URL is configured.
    pub fn build_remote(&self) -> Result<Option<HttpRemoteStore>> {
        self.validate()?;
        self.api_base_url
            .as_ref()
            .map(|url| HttpRemoteStore::new(url.clone(), self.request_timeout()))
            .transpose()
    }
}
