//! Layered configuration loading: compiled-in defaults, an optional file,
//! then `PROCUR_`-prefixed environment variables (§4.O).

use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};

use crate::{ConfigError, EngineConfig, Result};

pub const DEFAULT_ENV_PREFIX: &str = "PROCUR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads from a file, dispatching on extension.
    pub fn from_file(path: &Path) -> Result<EngineConfig> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::LoadError("no file extension found".to_string()))?;

        let content = std::fs::read_to_string(path)?;
        match extension {
            "toml" => Self::from_toml(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            other => Err(ConfigError::LoadError(format!("unsupported file extension: {other}"))),
        }
    }

    pub fn from_toml(content: &str) -> Result<EngineConfig> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_yaml(content: &str) -> Result<EngineConfig> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_json(content: &str) -> Result<EngineConfig> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// Loads overrides from `PROCUR_`-prefixed environment variables, e.g.
    /// `PROCUR_THRESHOLDS_BUYER_ACCEPT_THRESHOLD=0.8`.
    pub fn from_env() -> Result<EngineConfig> {
        Self::from_env_with_prefix(DEFAULT_ENV_PREFIX)
    }

    pub fn from_env_with_prefix(prefix: &str) -> Result<EngineConfig> {
        let config = Config::builder()
            .add_source(Environment::with_prefix(prefix).separator("_"))
            .build()?;
        config.try_deserialize().map_err(ConfigError::from)
    }

    /// §4.O's three-tier layering: defaults, then an optional file, then env.
    /// A missing file is not an error; absent env vars leave the file's
    /// values (or the defaults) untouched.
    pub fn load(file_path: Option<&Path>, env_prefix: &str) -> Result<EngineConfig> {
        let default_source = Config::try_from(&EngineConfig::default())?;
        let mut builder = Config::builder().add_source(default_source);

        if let Some(path) = file_path {
            let format = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => FileFormat::Toml,
                Some("yaml") | Some("yml") => FileFormat::Yaml,
                Some("json") => FileFormat::Json,
                _ => FileFormat::Toml,
            };
            builder = builder.add_source(File::from(path).format(format).required(false));
        }

        builder = builder.add_source(Environment::with_prefix(env_prefix).separator("_"));

        let config = builder.build()?;
        let loaded: EngineConfig = config.try_deserialize()?;
        crate::validation::validate_config(&loaded)?;
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_when_nothing_overrides() {
        let loaded = ConfigLoader::load(None, "PROCUR_TEST_UNUSED").unwrap();
        assert_eq!(loaded.thresholds.buyer_accept_threshold, 0.75);
        assert_eq!(loaded.rate_limit.rate_limit_capacity, 10);
    }

    #[test]
    fn toml_overrides_a_single_field() {
        let toml = r#"
            [thresholds]
            buyer_accept_threshold = 0.9

            [scoring]
            value = 0.5
            cost = 0.2
            risk = 0.2
            time = 0.1

            [negotiation]
            wall_clock_secs_per_round = 90

            [proposal]
            proposal_timeout_secs = 60
            proposal_retries = 3
            proposal_backoff_base_secs = 1

            [rate_limit]
            rate_limit_capacity = 10
            rate_limit_refill_per_sec = 5

            run_mode = "production"
        "#;
        let config = ConfigLoader::from_toml(toml).unwrap();
        assert_eq!(config.thresholds.buyer_accept_threshold, 0.9);
        assert_eq!(config.run_mode, procur_types::RunMode::Production);
    }

    #[test]
    fn unsupported_extension_errors() {
        let path = std::path::Path::new("config.ini");
        assert!(ConfigLoader::from_file(path).is_err());
    }
}
