//! Configuration management.

use anyhow::{Context, Result};
use nagstat_backends::BackendRegistry;
use nagstat_core::{BackendConfig, BackendError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Configured monitoring servers.
    #[serde(default)]
    pub servers: Vec<BackendConfig>,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Poll interval in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Log level for nagstat crates when not running verbose.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nagstat")
            .join("config.json")
    }

    /// Loads from `path`, or from the default path when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&Self::default_path()),
        }
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        info!(path = %path.display(), servers = config.servers.len(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Returns the enabled servers.
    pub fn enabled_servers(&self) -> impl Iterator<Item = &BackendConfig> {
        self.servers.iter().filter(|s| s.enabled)
    }

    /// Looks up a server by name.
    pub fn server(&self, name: &str) -> Result<&BackendConfig, BackendError> {
        self.servers
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| BackendError::InvalidConfig(format!("No server named '{name}'")))
    }

    /// Checks every enabled server before anything touches the network.
    pub fn validate(&self) -> Result<(), BackendError> {
        let mut names = std::collections::HashSet::new();
        for server in self.enabled_servers() {
            if !names.insert(server.name.as_str()) {
                return Err(BackendError::InvalidConfig(format!(
                    "Duplicate server name '{}'",
                    server.name
                )));
            }
            if BackendRegistry::get_by_tag(&server.kind).is_none() {
                return Err(BackendError::UnknownBackendType(server.kind.clone()));
            }
            Url::parse(server.base_url()).map_err(|e| {
                BackendError::InvalidConfig(format!(
                    "{}: invalid monitor URL '{}': {e}",
                    server.name, server.monitor_url
                ))
            })?;
        }
        if self.general.refresh_interval_secs == 0 {
            return Err(BackendError::InvalidConfig(
                "refresh_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// A starter configuration with one server of each type, all disabled.
    pub fn sample() -> Self {
        let mut opsview = BackendConfig::new("opsview", "opsview", "https://opsview.example.com")
            .with_credentials("admin", "changeme");
        opsview.enabled = false;
        let mut thruk = BackendConfig::new("thruk", "thruk", "https://thruk.example.com/thruk")
            .with_credentials("thrukadmin", "changeme");
        thruk.enabled = false;

        Self {
            general: GeneralConfig::default(),
            servers: vec![opsview, thruk],
        }
    }
}
