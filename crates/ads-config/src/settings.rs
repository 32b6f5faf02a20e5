//! Application settings
//!
//! Loaded from an optional `config/default.toml`, then `RUSTY_ADS_*`
//! environment variables (nested keys separated by `__`, e.g.
//! `RUSTY_ADS_DATABASE__URL`). A `.env` file is read first when present.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "RUSTY_ADS";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub media: MediaConfig,
    pub ads: AdsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Local blob storage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaConfig {
    /// Directory uploads are written under.
    pub root: String,
    /// Public prefix of returned media URLs.
    pub url_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdsConfig {
    /// Country stamped on every created ad.
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub json: bool,
}

impl AppConfig {
    /// Loads `.env`, the default config file and the process environment.
    ///
    /// # Errors
    /// Returns an error if a source is malformed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is fine.
        let _ = dotenvy::dotenv();
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Like [`AppConfig::load`] but with an explicit config file path and no
    /// `.env` handling.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        build(path.as_ref(), env_source())
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("database.url", self.database.url));
        }
        if self.ads.country.trim().is_empty() {
            return Err(ConfigError::InvalidValue("ads.country", self.ads.country));
        }
        if self.media.root.trim().is_empty() {
            return Err(ConfigError::InvalidValue("media.root", self.media.root));
        }
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build(path: &Path, env: Environment) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .set_default("database.url", "sqlite:rusty_ads.db")?
        .set_default("media.root", "./data/uploads")?
        .set_default("media.url_prefix", "/static/uploads")?
        .set_default("ads.country", "Iraq")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?
        .add_source(File::from(path).required(false))
        .add_source(env)
        .build()?;

    settings.try_deserialize::<AppConfig>()?.validate()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}: {1:?}")]
    InvalidValue(&'static str, String),
}
