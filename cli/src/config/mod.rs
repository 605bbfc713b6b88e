//! Configuration management for the Macro Monitor CLI
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: MM__)

use anyhow::Result;
use macro_monitor_shared::LossRate;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub estimation: EstimationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the profile store lives on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// JSON blob holding every profile
    pub profiles_file: String,
    /// Scalar file holding the current profile id
    pub current_file: String,
}

/// Estimation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationConfig {
    /// Weekly loss rate macros are computed for when none is given
    pub default_rate: LossRate,
    /// Targets below this are logged as a warning (never clamped)
    pub low_intake_warning_kcal: i32,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of pretty output
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: PathBuf::from("data"),
                profiles_file: "profiles.json".to_string(),
                current_file: "current_profile".to_string(),
            },
            estimation: EstimationConfig {
                default_rate: LossRate::Rate15,
                low_intake_warning_kcal: 1200,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with MM__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (MM__ prefix)
            // e.g., MM__STORAGE__DATA_DIR=/var/lib/macro-monitor sets storage.data_dir
            .add_source(config::Environment::with_prefix("MM").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }

    /// Whether log output should be JSON
    pub fn json_logs(&self) -> bool {
        self.logging.json || Self::is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.storage.profiles_file, "profiles.json");
        assert_eq!(config.estimation.default_rate, LossRate::Rate15);
        assert_eq!(config.estimation.low_intake_warning_kcal, 1200);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_defaults_survive_config_builder() {
        let built = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default()).unwrap())
            .build()
            .unwrap();
        let config: AppConfig = built.try_deserialize().unwrap();
        assert_eq!(config.storage.current_file, "current_profile");
        assert_eq!(config.estimation.default_rate, LossRate::Rate15);
    }

    #[test]
    fn test_is_production() {
        // Default should be false (development)
        assert!(!AppConfig::is_production());
    }
}
