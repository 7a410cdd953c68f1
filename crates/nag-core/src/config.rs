//! Configuration loading.
//!
//! Configuration lives in `config.toml` inside the config directory. Every
//! key is optional; a missing file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "NAG_CONFIG_DIR";

/// Name of the configuration file inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Public OAuth client id of the Nag GitHub app.
pub const DEFAULT_CLIENT_ID: &str = "Ov23licG1RL6kHbffnWN";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// GitHub endpoints and OAuth app.
    pub github: GitHubConfig,

    /// Desktop notification settings.
    pub notifications: NotificationConfig,
}

/// GitHub connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    /// REST API base URL.
    pub api_url: String,

    /// Host serving `/login/device/code` and `/login/oauth/access_token`.
    pub oauth_url: String,

    /// OAuth app client id used for the device flow.
    pub client_id: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: nag_github::GitHubClient::DEFAULT_API_URL.to_string(),
            oauth_url: nag_github::DeviceFlowClient::DEFAULT_OAUTH_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
        }
    }
}

/// Notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    /// Announce newly requested reviews.
    pub enabled: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Resolve the config directory.
    ///
    /// `$NAG_CONFIG_DIR` wins; otherwise the platform config dir plus `nag`.
    ///
    /// # Errors
    /// Returns error if no config directory can be determined.
    pub fn dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        dirs::config_dir()
            .map(|dir| dir.join("nag"))
            .ok_or_else(|| Error::Config("could not determine a config directory".to_string()))
    }

    /// Path of the config file inside `dir`.
    #[must_use]
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Load configuration from `dir`, falling back to defaults.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::path(dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.github.client_id.trim().is_empty() {
            return Err(Error::Config("github.client_id cannot be empty".to_string()));
        }

        for (key, url) in [
            ("github.api_url", &self.github.api_url),
            ("github.oauth_url", &self.github.oauth_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(Error::Config(format!("{key} must be an http(s) URL")));
            }
        }

        Ok(())
    }
}
