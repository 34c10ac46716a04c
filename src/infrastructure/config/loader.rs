//! Hierarchical configuration loading (spec §6 "Configuration").

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("front_end.timeout_secs must be positive")]
    InvalidTimeout,

    #[error("clock.tick_hour must be in 0..24")]
    InvalidTickHour,

    #[error("clock.tick_minute must be in 0..60")]
    InvalidTickMinute,

    #[error("invalid time zone identifier: {0}")]
    InvalidTimezone(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `.cadence/config.yaml` (project config)
    /// 3. `.cadence/local.yaml` (optional local overrides)
    /// 4. Environment variables (`CADENCE_` prefix, `__`-nested)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".cadence/config.yaml"))
            .merge(Yaml::file(".cadence/local.yaml"))
            .merge(Env::prefixed("CADENCE_").split("__"))
            .extract()
            .context("failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.front_end.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if config.clock.tick_hour >= 24 {
            return Err(ConfigError::InvalidTickHour);
        }
        if config.clock.tick_minute >= 60 {
            return Err(ConfigError::InvalidTickMinute);
        }
        config
            .clock
            .timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(config.clock.timezone.clone()))?;
        Ok(())
    }
}
