//! Pipeline configuration
//!
//! Layered with figment, highest priority last:
//! 1. Built-in defaults
//! 2. TOML file (explicit path, or `./fmea.toml` when present)
//! 3. Environment variables prefixed `FMEA_` (`__` separates nested keys,
//!    e.g. `FMEA_THRESHOLD=40`, `FMEA_INGEST__ROW_LIMIT=1000`)
//!
//! `threshold` is the only scoring parameter. The similarity tolerance, time
//! window, severity breakpoints and detection constant are fixed policy.

use crate::ingest::IngestConfig;
use crate::scoring::DEFAULT_THRESHOLD;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "fmea.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FMEA_";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FmeaConfig {
    /// RPN at or above which a transaction is High Risk
    pub threshold: u32,

    pub ingest: IngestConfig,
}

impl Default for FmeaConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            ingest: IngestConfig::default(),
        }
    }
}

impl FmeaConfig {
    /// Load from defaults, an optional TOML file and the environment
    ///
    /// When `path` is `None`, `./fmea.toml` is merged if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(FmeaConfig::default()));

        match path {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
                }
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: FmeaConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the normalizer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let columns = &self.ingest.columns;
        for (key, value) in [
            ("ingest.columns.amount", &columns.amount),
            ("ingest.columns.transaction_type", &columns.transaction_type),
            ("ingest.columns.date", &columns.date),
            ("ingest.columns.time", &columns.time),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }

        if let Some(id_column) = &self.ingest.id_column {
            if id_column.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "ingest.id_column must not be empty when set".to_string(),
                ));
            }
        }

        if self.ingest.row_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "ingest.row_limit must be positive when set".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::RowErrorPolicy;

    #[test]
    fn test_default_config() {
        let config = FmeaConfig::default();
        assert_eq!(config.threshold, 30);
        assert_eq!(config.ingest.on_row_error, RowErrorPolicy::Skip);
        assert_eq!(config.ingest.row_limit, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_and_env_layering() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                    threshold = 45

                    [ingest]
                    row_limit = 1000
                    on_row_error = "abort"
                "#,
            )?;
            jail.set_env("FMEA_THRESHOLD", "60");

            let config = FmeaConfig::load(Some(Path::new("custom.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.threshold, 60, "environment overrides the file");
            assert_eq!(config.ingest.row_limit, Some(1000));
            assert_eq!(config.ingest.on_row_error, RowErrorPolicy::Abort);
            assert_eq!(config.ingest.columns.amount, "Transaction_Amount");
            Ok(())
        });
    }

    #[test]
    fn test_empty_column_name_rejected() {
        let mut config = FmeaConfig::default();
        config.ingest.columns.date = " ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
