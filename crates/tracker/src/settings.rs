//! Runtime Configuration
//!
//! Layered as: built-in defaults, then an optional `inventory.toml` (or an
//! explicit file), then `INVENTORY_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a batch deploy treats rows without enough stock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployPolicy {
    /// Subtract and clamp each row at zero
    #[default]
    Clamp,
    /// Reject the whole batch if any row is short
    Strict,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Max tracing level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    pub deploy_policy: DeployPolicy,
    /// Longest accepted item or location name
    pub max_name_len: usize,
    /// Directory for exports when no explicit path is given
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("inventory.db"),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            deploy_policy: DeployPolicy::Clamp,
            max_name_len: 200,
            export_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Load settings. An explicit `file` must exist; the default
    /// `inventory.toml` is optional.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        let builder = Config::builder()
            .set_default("database_path", defaults.database_path.to_string_lossy().as_ref())?
            .set_default("log_level", defaults.log_level.as_str())?
            .set_default("log_format", "text")?
            .set_default("deploy_policy", "clamp")?
            .set_default("max_name_len", defaults.max_name_len as i64)?
            .set_default("export_dir", defaults.export_dir.to_string_lossy().as_ref())?;

        let builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("inventory").required(false)),
        };

        builder
            .add_source(Environment::with_prefix("INVENTORY").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
