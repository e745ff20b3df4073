//! Alpha Vantage API client

use crate::error::{Result, StockError};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// Fundamentals from the OVERVIEW function. Alpha Vantage sends numbers as
/// strings and uses "None" or "-" for missing values.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyOverview {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "50DayMovingAverage")]
    pub dma_50: Option<String>,
    #[serde(rename = "200DayMovingAverage")]
    pub dma_200: Option<String>,
}

impl CompanyOverview {
    pub fn pe_ratio(&self) -> Option<f64> {
        parse_number(self.pe_ratio.as_deref())
    }

    pub fn dma_50(&self) -> Option<f64> {
        parse_number(self.dma_50.as_deref())
    }

    pub fn dma_200(&self) -> Option<f64> {
        parse_number(self.dma_200.as_deref())
    }
}

/// Price and volume from the GLOBAL_QUOTE function
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    pub symbol: String,
    #[serde(rename = "05. price")]
    pub price: Option<String>,
    #[serde(rename = "06. volume")]
    pub volume: Option<String>,
}

impl GlobalQuote {
    pub fn price(&self) -> Option<f64> {
        parse_number(self.price.as_deref())
    }

    pub fn volume(&self) -> Option<u64> {
        self.volume.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (5 on the free tier)
    /// * `timeout` - Per-request HTTP timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let per_minute = NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter,
        })
    }

    /// Get company overview and fundamental data
    pub async fn company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let data = self.query("OVERVIEW", symbol).await?;

        // An unknown symbol comes back as an empty object
        if data.as_object().is_none_or(serde_json::Map::is_empty) {
            return Err(StockError::AlphaVantageError(format!(
                "no overview for {symbol}"
            )));
        }

        Ok(serde_json::from_value(data)?)
    }

    /// Get global quote (current price data)
    pub async fn global_quote(&self, symbol: &str) -> Result<GlobalQuote> {
        let mut data = self.query("GLOBAL_QUOTE", symbol).await?;

        let quote = data
            .get_mut("Global Quote")
            .map(serde_json::Value::take)
            .filter(|q| q.as_object().is_some_and(|o| !o.is_empty()))
            .ok_or_else(|| StockError::AlphaVantageError(format!("no quote for {symbol}")))?;

        Ok(serde_json::from_value(quote)?)
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;

        let params = [
            ("function", function),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ];
        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(StockError::AlphaVantageError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        check_payload(response.json().await?)
    }
}

/// Map Alpha Vantage's in-band error keys to errors
fn check_payload(data: serde_json::Value) -> Result<serde_json::Value> {
    if let Some(error) = data.get("Error Message") {
        return Err(StockError::AlphaVantageError(error.to_string()));
    }

    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(StockError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        });
    }

    Ok(data)
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
