//! Configuration for the suggestion engine

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// LLM ranking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Model identifier passed to the provider
    pub model: String,
    /// Completion token budget
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
}

impl RankingConfig {
    /// Ranking with the given model and default sampling settings
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 256,
            temperature: 0.2,
        }
    }
}

/// Configuration for suggestion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Upper bound for a single live metric call
    pub request_timeout: Duration,

    /// Upper bound for the ranking call
    pub ranking_timeout: Duration,

    /// Maximum number of symbols fetched at once
    pub max_concurrency: usize,

    /// Skip every live source
    pub offline: bool,

    /// Fall back to synthetic metrics when live sources fail
    pub synthetic_fallback: bool,

    /// Alpha Vantage API key (optional)
    pub alpha_vantage_api_key: Option<String>,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,

    /// LLM ranking, disabled when `None`
    pub ranking: Option<RankingConfig>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            ranking_timeout: Duration::from_secs(20),
            max_concurrency: 4,
            offline: false,
            synthetic_fallback: true,
            alpha_vantage_api_key: None,
            alpha_vantage_rate_limit: 5, // free tier
            ranking: None,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.offline && !self.synthetic_fallback {
            return Err(StockError::ConfigError(
                "offline mode requires the synthetic fallback".to_string(),
            ));
        }

        if self.max_concurrency == 0 {
            return Err(StockError::ConfigError(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() || self.ranking_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "timeouts must be greater than 0".to_string(),
            ));
        }

        if self.alpha_vantage_rate_limit == 0 {
            return Err(StockError::ConfigError(
                "alpha_vantage_rate_limit must be greater than 0".to_string(),
            ));
        }

        if let Some(ranking) = &self.ranking {
            if ranking.model.trim().is_empty() {
                return Err(StockError::ConfigError(
                    "ranking model must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Whether live sources should be queried
    pub fn live_enabled(&self) -> bool {
        !self.offline
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    request_timeout: Option<Duration>,
    ranking_timeout: Option<Duration>,
    max_concurrency: Option<usize>,
    offline: Option<bool>,
    synthetic_fallback: Option<bool>,
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_rate_limit: Option<u32>,
    ranking: Option<RankingConfig>,
}

impl StockConfigBuilder {
    /// Set the live metric timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the ranking timeout
    pub fn ranking_timeout(mut self, duration: Duration) -> Self {
        self.ranking_timeout = Some(duration);
        self
    }

    /// Set how many symbols may be fetched concurrently
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// Skip all live sources
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = Some(offline);
        self
    }

    /// Enable or disable the synthetic fallback
    pub fn synthetic_fallback(mut self, enabled: bool) -> Self {
        self.synthetic_fallback = Some(enabled);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set Alpha Vantage requests per minute
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Enable LLM ranking
    pub fn ranking(mut self, ranking: RankingConfig) -> Self {
        self.ranking = Some(ranking);
        self
    }

    /// Load Alpha Vantage API key from `ALPHA_VANTAGE_API_KEY`
    pub fn with_env_api_key(mut self) -> Self {
        if let Some(key) = non_empty_env("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Enable ranking with the model named by `OPENAI_MODEL`
    pub fn with_env_ranking(mut self) -> Self {
        if let Some(model) = non_empty_env("OPENAI_MODEL") {
            self.ranking = Some(RankingConfig::new(model));
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            ranking_timeout: self.ranking_timeout.unwrap_or(defaults.ranking_timeout),
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
            offline: self.offline.unwrap_or(defaults.offline),
            synthetic_fallback: self
                .synthetic_fallback
                .unwrap_or(defaults.synthetic_fallback),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            ranking: self.ranking,
        };

        config.validate()?;
        Ok(config)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.synthetic_fallback);
        assert!(config.live_enabled());
        assert!(config.ranking.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .request_timeout(Duration::from_millis(800))
            .max_concurrency(8)
            .alpha_vantage_api_key("demo")
            .ranking(RankingConfig::new("gpt-4o-mini"))
            .build()
            .unwrap();

        assert_eq!(config.request_timeout, Duration::from_millis(800));
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.alpha_vantage_api_key.as_deref(), Some("demo"));
        assert_eq!(config.ranking.unwrap().max_tokens, 256);
    }

    #[test]
    fn test_offline_without_fallback_rejected() {
        let result = StockConfig::builder()
            .offline(true)
            .synthetic_fallback(false)
            .build();
        assert!(matches!(result, Err(StockError::ConfigError(_))));
    }

    #[test]
    fn test_validation_limits() {
        let config = StockConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StockConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StockConfig {
            ranking: Some(RankingConfig::new("  ")),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
