//! Configuration management for the analytics core

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Cache tuning
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Upstream backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend REST API
    pub base_url: String,

    /// API key sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/rest/v1".to_string(),
            api_key: None,
        }
    }
}

/// Cache tuning knobs.
///
/// Defaults match the production values: dashboard aggregates live for
/// 4 minutes, realtime views for 30 seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for the dashboard aggregate report, in seconds
    #[serde(default = "default_dashboard_ttl")]
    pub dashboard_ttl_secs: u64,

    /// TTL for the realtime snapshot, in seconds
    #[serde(default = "default_realtime_ttl")]
    pub realtime_ttl_secs: u64,

    /// TTL for per-equipment score reports, in seconds
    #[serde(default = "default_scores_ttl")]
    pub scores_ttl_secs: u64,

    /// Background expiry sweep interval, in seconds. Zero disables the sweep.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_dashboard_ttl() -> u64 {
    4 * 60
}

fn default_realtime_ttl() -> u64 {
    30
}

fn default_scores_ttl() -> u64 {
    4 * 60
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dashboard_ttl_secs: default_dashboard_ttl(),
            realtime_ttl_secs: default_realtime_ttl(),
            scores_ttl_secs: default_scores_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl CacheConfig {
    pub fn dashboard_ttl(&self) -> Duration {
        Duration::from_secs(self.dashboard_ttl_secs)
    }

    pub fn realtime_ttl(&self) -> Duration {
        Duration::from_secs(self.realtime_ttl_secs)
    }

    pub fn scores_ttl(&self) -> Duration {
        Duration::from_secs(self.scores_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or(ConfigError::Invalid(
            "Could not determine config directory".to_string(),
        ))?;

        Ok(base.join("plantops").join("config.yaml"))
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // The API key lands in this file; keep it private on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Validate that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.base_url must not be empty".to_string()).into());
        }
        if self.cache.dashboard_ttl_secs == 0
            || self.cache.realtime_ttl_secs == 0
            || self.cache.scores_ttl_secs == 0
        {
            return Err(ConfigError::Invalid("cache TTLs must be greater than zero".to_string()).into());
        }
        Ok(())
    }
}
