//! Configuration management utilities

use crate::logging::LogFormat;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "xtrade".to_string(),
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Overlay values from `XTRADE_ENV` and `XTRADE_LOG_FORMAT`.
    ///
    /// Production defaults to JSON logs. An explicit, parsable
    /// `XTRADE_LOG_FORMAT` always wins.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("XTRADE_ENV").ok(),
            std::env::var("XTRADE_LOG_FORMAT").ok(),
        )
    }

    fn from_vars(environment: Option<String>, log_format: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(environment) = environment {
            config.environment = environment;
        }
        if config.is_production() {
            config.log_format = LogFormat::Json;
        }
        if let Some(format) = log_format.and_then(|v| v.parse().ok()) {
            config.log_format = format;
        }
        config
    }

    /// Whether the application runs in production
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production") || self.environment == "prod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.app_name, "xtrade");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(!config.is_production());
    }

    #[test]
    fn test_production_logs_json() {
        let config = Config::from_vars(Some("production".to_string()), None);
        assert!(config.is_production());
        assert_eq!(config.log_format, LogFormat::Json);

        let config = Config::from_vars(Some("prod".to_string()), Some("pretty".to_string()));
        assert_eq!(config.log_format, LogFormat::Pretty);

        let config = Config::from_vars(Some("staging".to_string()), Some("yaml".to_string()));
        assert!(!config.is_production());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["log_format"], "pretty");
        assert_eq!(json["environment"], "development");
    }
}
