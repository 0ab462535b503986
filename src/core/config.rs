use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::currency::BASE_CURRENCY;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TransactionProviderConfig {
    /// Base URL of the dashboard backend serving transactions.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateProviderConfig {
    /// Base URL of an exchange-rate endpoint pinned to USD. When absent the
    /// built-in rate table is used.
    pub base_url: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub transactions: Option<TransactionProviderConfig>,
    pub rates: Option<RateProviderConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// Maximum age of cached data before a read triggers a refresh.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
    /// Upper bound on a single rate-table fetch.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

fn default_ttl_ms() -> u64 {
    300_000
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_ms: default_ttl_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

fn default_currency() -> String {
    BASE_CURRENCY.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Currency monetary values are displayed in.
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub cache: CacheConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "finsync", "finsync")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "finsync", "finsync")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
