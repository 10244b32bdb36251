//! Runtime settings for a predictor instance.
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{DEFAULT_DELAY_MS, DEFAULT_HISTORY_KEY};

const fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_storage_key() -> String {
    DEFAULT_HISTORY_KEY.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage key must not be empty")]
    EmptyStorageKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Calculation delay before a result is produced.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Name of the persisted history record.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Fixed RNG seed; `None` seeds from entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            storage_key: default_storage_key(),
            seed: None,
        }
    }
}

impl PredictorConfig {
    /// Parse and validate a JSON config; omitted fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the config is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyStorageKey`] for a blank record name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(())
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    #[must_use]
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
