use crate::core::rates::ReferenceCurrency;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_UPSTREAM_URL: &str = "https://www.cbr-xml-daily.ru/daily_json.js";

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_cache_ttl_seconds() -> u64 {
    3600
}

fn default_request_timeout_seconds() -> u64 {
    5
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_upstream_url", alias = "upstreamURL")]
    pub upstream_url: String,
    #[serde(default = "default_cache_ttl_seconds", alias = "cacheTTLSeconds")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub reference_currency: ReferenceCurrency,
    /// Reject codes missing from the rate table instead of treating them as
    /// the reference currency.
    #[serde(default)]
    pub strict_currencies: bool,
    #[serde(default)]
    pub serve_stale_on_error: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            upstream_url: default_upstream_url(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
            reference_currency: ReferenceCurrency::default(),
            strict_currencies: false,
            serve_stale_on_error: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Like [`AppConfig::load`], but falls back to defaults when no config
    /// file exists yet.
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("ru", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
