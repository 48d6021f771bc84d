use crate::error::ConfigError;
use crate::models::{Formation, Price};
use serde::{Deserialize, Serialize};
use std::{env, fs};

pub const CONFIG_PATH_ENV: &str = "LINEUP_CONFIG_PATH";

/// Budget used when a team has no balance on record.
pub const DEFAULT_BUDGET: Price = Price::from_units(200);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_budget: Price,
    pub default_formation: Formation,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { default_budget: DEFAULT_BUDGET, default_formation: Formation::DEFAULT }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
        Self::from_json(&content)
    }

    /// Load from the file named by `LINEUP_CONFIG_PATH`; defaults when the
    /// variable is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        let config = Self::from_file(path)?;
        tracing::info!(path, "engine config loaded from {}", CONFIG_PATH_ENV);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_budget.is_negative() {
            return Err(ConfigError::Invalid(format!(
                "default_budget must not be negative, got {}",
                self.default_budget
            )));
        }
        Ok(())
    }
}
