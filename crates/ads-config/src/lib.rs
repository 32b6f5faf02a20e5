//! # ads-config
//!
//! Settings and logging setup shared by the Rusty-Ads binaries.

mod settings;
mod telemetry;

pub use settings::{
    AdsConfig, AppConfig, ConfigError, DatabaseConfig, LogConfig, MediaConfig,
    DEFAULT_CONFIG_FILE, ENV_PREFIX,
};
pub use telemetry::{try_init_tracing, TracingError};
