//! Configuration management for the procurement negotiation engine (§4.O).
//!
//! - Layered loading (defaults, file, `PROCUR_`-prefixed env) in [`loader`]
//! - Validation of cross-field invariants in [`validation`]
//! - Optional file-watch hot-reload for long-lived hosts in [`watcher`]

mod config;
mod loader;
mod validation;
mod watcher;

pub use config::*;
pub use loader::*;
pub use validation::*;
pub use watcher::*;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    LoadError(String),

    #[error("config validation failed: {0}")]
    ValidationError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("config library error: {0}")]
    ConfigLibError(#[from] ::config::ConfigError),

    #[error("toml parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("yaml parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("json parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("watch error: {0}")]
    WatchError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
