//! Yahoo Finance API client

use crate::error::{Result, StockError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
/// Sets the session cookie the crumb is bound to
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) xtrade/0.1";

/// One daily bar, reduced to what the metric pipeline consumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBar {
    pub close: f64,
    pub volume: u64,
}

/// Subset of the v7 quote payload
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub symbol: String,
    pub regular_market_price: Option<f64>,
    pub regular_market_volume: Option<u64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<QuoteSummary>,
    #[serde(default)]
    error: Option<Value>,
}

/// Yahoo Finance API client
///
/// The quote endpoint rejects requests without a session cookie and the
/// matching crumb. Both are fetched on first use and shared by clones.
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    http: Client,
    crumb: Arc<Mutex<Option<String>>>,
}

impl YahooFinanceClient {
    /// Create a client whose quote requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            http,
            crumb: Arc::new(Mutex::new(None)),
        })
    }

    /// Daily bars for `ticker` over `range` (e.g. "1y"), oldest first
    pub async fn daily_history(&self, ticker: &str, range: &str) -> Result<Vec<DailyBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let response = provider
            .get_quote_range(ticker, "1d", range)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        debug!(ticker, bars = quotes.len(), "Fetched daily history");

        Ok(quotes
            .iter()
            .filter(|q| q.close.is_finite() && q.close > 0.0)
            .map(|q| DailyBar {
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }

    /// Latest quote summary, which carries the trailing P/E
    pub async fn quote_summary(&self, ticker: &str) -> Result<QuoteSummary> {
        let mut retried = false;
        loop {
            let crumb = self.crumb().await?;
            let response = self
                .http
                .get(QUOTE_URL)
                .query(&[("symbols", ticker), ("crumb", crumb.as_str())])
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !retried {
                warn!(ticker, "Yahoo crumb rejected, refreshing session");
                self.invalidate_crumb().await;
                retried = true;
                continue;
            }

            let body = response.text().await?;
            if !status.is_success() {
                let data = serde_json::from_str(&body).unwrap_or(Value::Null);
                return Err(finance_error(&data).unwrap_or_else(|| {
                    StockError::YahooFinanceError(format!("HTTP error: {status}"))
                }));
            }

            return parse_quote_summary(serde_json::from_str(&body)?, ticker);
        }
    }

    /// Cached crumb, or a fresh cookie and crumb pair.
    ///
    /// The lock is held across the fetch so concurrent lookups share one
    /// session handshake.
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // fc.yahoo.com answers 404 but still sets the cookie
        if let Err(e) = self.http.get(COOKIE_URL).send().await {
            debug!(error = %e, "Yahoo cookie request failed");
        }

        let response = self.http.get(CRUMB_URL).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StockError::YahooFinanceError(format!(
                "crumb request failed: HTTP {status}"
            )));
        }

        let crumb = valid_crumb(&response.text().await?).ok_or_else(|| {
            StockError::YahooFinanceError("crumb response was not a crumb".to_string())
        })?;
        debug!("Acquired Yahoo crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate_crumb(&self) {
        self.crumb.lock().await.take();
    }
}

/// A crumb is a short opaque token; rate-limit pages and JSON errors are not
fn valid_crumb(text: &str) -> Option<String> {
    let crumb = text.trim();
    let plausible = !crumb.is_empty()
        && crumb.len() <= 64
        && !crumb.contains(['<', '{', ' ', '\n']);
    plausible.then(|| crumb.to_string())
}

/// `{"finance": {"error": {"code": ..., "description": ...}}}`
fn finance_error(data: &Value) -> Option<StockError> {
    let error = data.pointer("/finance/error").filter(|e| e.is_object())?;
    let code = error.get("code").and_then(Value::as_str).unwrap_or("Error");
    let description = error
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("no description");
    Some(StockError::YahooFinanceError(format!("{code}: {description}")))
}

fn parse_quote_summary(data: Value, ticker: &str) -> Result<QuoteSummary> {
    if let Some(error) = finance_error(&data) {
        return Err(error);
    }

    let envelope: QuoteEnvelope = serde_json::from_value(data)?;

    if let Some(error) = envelope.quote_response.error.filter(|e| !e.is_null()) {
        return Err(StockError::YahooFinanceError(error.to_string()));
    }

    envelope
        .quote_response
        .result
        .into_iter()
        .find(|q| q.symbol.eq_ignore_ascii_case(ticker))
        .ok_or_else(|| StockError::YahooFinanceError(format!("no quote returned for {ticker}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_quote_summary() {
        let data = json!({
            "quoteResponse": {
                "result": [{
                    "symbol": "TCS.NS",
                    "regularMarketPrice": 3890.5,
                    "regularMarketVolume": 1520034,
                    "trailingPE": 29.8
                }],
                "error": null
            }
        });

        let quote = parse_quote_summary(data, "TCS.NS").unwrap();
        assert_eq!(quote.trailing_pe, Some(29.8));
        assert_eq!(quote.regular_market_volume, Some(1_520_034));
    }

    #[test]
    fn test_parse_quote_without_pe() {
        let data = json!({"quoteResponse": {"result": [{"symbol": "AAPL"}]}});
        let quote = parse_quote_summary(data, "AAPL").unwrap();
        assert!(quote.trailing_pe.is_none());
    }

    #[test]
    fn test_parse_quote_errors() {
        let empty = json!({"quoteResponse": {"result": [], "error": null}});
        assert!(matches!(
            parse_quote_summary(empty, "NOPE"),
            Err(StockError::YahooFinanceError(_))
        ));

        let failed = json!({"quoteResponse": {"result": [], "error": {"code": "Unauthorized"}}});
        assert!(parse_quote_summary(failed, "AAPL").is_err());

        assert!(matches!(
            parse_quote_summary(json!({"finance": null}), "AAPL"),
            Err(StockError::JsonError(_))
        ));
    }

    #[test]
    fn test_parse_finance_error_envelope() {
        let data = json!({
            "finance": {
                "result": null,
                "error": {"code": "Unauthorized", "description": "Invalid Crumb"}
            }
        });

        match parse_quote_summary(data, "AAPL") {
            Err(StockError::YahooFinanceError(message)) => {
                assert_eq!(message, "Unauthorized: Invalid Crumb");
            }
            other => panic!("expected YahooFinanceError, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_crumb() {
        assert_eq!(valid_crumb("aB3.xYz/9Q\n").as_deref(), Some("aB3.xYz/9Q"));
        assert_eq!(valid_crumb(""), None);
        assert_eq!(valid_crumb("<html>Too Many Requests</html>"), None);
        assert_eq!(
            valid_crumb(r#"{"finance":{"error":{"code":"Unauthorized"}}}"#),
            None
        );
        assert_eq!(valid_crumb("Too Many Requests"), None);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_quote_summary_with_crumb() {
        let client = YahooFinanceClient::new(Duration::from_secs(10)).unwrap();
        let quote = client.quote_summary("AAPL").await.unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert!(quote.regular_market_price.is_some());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_daily_history() {
        let client = YahooFinanceClient::new(Duration::from_secs(10)).unwrap();
        let bars = client.daily_history("AAPL", "1y").await.unwrap();
        assert!(bars.len() > 200);
        assert!(bars.iter().all(|b| b.close > 0.0));
    }
}
