//! Error types for stock suggestion operations

use thiserror::Error;

/// Stock suggestion specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Malformed ticker identifier
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// A live metric source could not produce a complete metric set
    #[error("{provider} unavailable: {reason}")]
    UpstreamUnavailable {
        provider: String,
        reason: String,
    },

    /// Request payload could not be turned into a suggestion request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantageError(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Universe ranking failed
    #[error("Ranking error: {0}")]
    Ranking(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Shorthand for an [`StockError::UpstreamUnavailable`]
    pub fn upstream(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error means the request itself was unusable
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }
}

impl From<xtrade_llm::LLMError> for StockError {
    fn from(err: xtrade_llm::LLMError) -> Self {
        StockError::Ranking(err.to_string())
    }
}

impl From<csv::Error> for StockError {
    fn from(err: csv::Error) -> Self {
        StockError::Other(format!("CSV error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::InvalidSymbol("1BAD".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: 1BAD");

        let err = StockError::upstream("yahoo", "timed out after 5s");
        assert_eq!(err.to_string(), "yahoo unavailable: timed out after 5s");
    }

    #[test]
    fn test_error_conversion() {
        let err: StockError = xtrade_llm::LLMError::AuthenticationFailed.into();
        match err {
            StockError::Ranking(msg) => assert!(msg.contains("authentication")),
            other => panic!("Expected Ranking variant, got {other:?}"),
        }
        assert!(StockError::BadRequest("x".into()).is_bad_request());
        assert!(!StockError::Other("x".into()).is_bad_request());
    }
}
