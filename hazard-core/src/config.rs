use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::WeatherSource;

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
///
/// Only the weather providers carry credentials; USGS is keyless and EMSC is
/// a placeholder, so neither appears here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default weather source, e.g. "openweathermap" or "weatherapi".
    pub default_source: Option<String>,

    /// Example TOML:
    /// [providers.openweathermap]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Return the default weather source as a strongly-typed value.
    pub fn default_weather_source(&self) -> Result<WeatherSource> {
        let s = self.default_source.as_ref().ok_or_else(|| {
            anyhow!(
                "No default weather source configured.\n\
                 Hint: run `hazard configure <source>` (e.g. `hazard configure openweathermap`) first."
            )
        })?;

        WeatherSource::try_from(s.as_str()).map_err(|err| anyhow!(err.to_string()))
    }

    pub fn set_default_source(&mut self, source: WeatherSource) {
        self.default_source = Some(source.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "hazardhub", "hazard-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key; the first configured provider becomes
    /// the default weather source.
    pub fn upsert_provider_api_key(&mut self, provider: &str, api_key: String) {
        self.providers.insert(provider.to_string(), ProviderConfig { api_key });

        if self.default_source.is_none() {
            self.default_source = Some(provider.to_string());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider: &str) -> Option<&str> {
        self.providers.get(provider).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider: &str) -> bool {
        self.provider_api_key(provider).is_some()
    }
}
