//! # configs
//!
//! Layered settings for the forum host: built-in defaults, then an optional
//! TOML file, then `RUSTY_FORUM__*` environment variables (a `.env` file is
//! loaded into the environment first).
//!
//! `RUSTY_FORUM__STORAGE__BACKEND=memory` overrides `storage.backend`, and so on.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Default config file, looked up in the working directory without extension.
pub const DEFAULT_CONFIG_FILE: &str = "rusty-forum";

const ENV_PREFIX: &str = "RUSTY_FORUM";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-lifetime store, lost on exit
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// sqlx connection URL, e.g. `sqlite:rusty_forum.db`
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub storage: StorageSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Loads `.env`, then [`DEFAULT_CONFIG_FILE`] if present, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::build(config::File::with_name(DEFAULT_CONFIG_FILE).required(false), ENV_PREFIX)
    }

    /// Like [`Settings::load`] but with an explicit, mandatory config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        load_dotenv();
        Self::build(config::File::from(path).required(true), ENV_PREFIX)
    }

    fn build<S>(file: S, env_prefix: &str) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings: Settings = config::Config::builder()
            .set_default("storage.backend", "sqlite")?
            .set_default("storage.database_url", "sqlite:rusty_forum.db")?
            .set_default("log.filter", "info")?
            .set_default("log.format", "pretty")?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Sqlite
            && self.storage.database_url.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "storage.database_url is required for the sqlite backend".into(),
            ));
        }
        Ok(())
    }
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => debug!(error = %e, "ignoring unreadable .env"),
    }
}
