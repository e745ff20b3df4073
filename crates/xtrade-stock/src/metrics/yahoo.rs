//! Live metrics from Yahoo Finance

use super::source::{Listing, MetricSource};
use crate::api::{DailyBar, QuoteSummary, YahooFinanceClient};
use crate::domain::{AnalysisMode, MetricOrigin, Metrics};
use crate::error::{Result, StockError};
use crate::indicators::{LONG_WINDOW, SHORT_WINDOW, simple_moving_average};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

const NAME: &str = "yahoo";
const HISTORY_RANGE: &str = "1y";

/// Price and volume from the latest quote, averages from one year of daily
/// closes, P/E from the quote summary.
#[derive(Debug, Clone)]
pub struct YahooMetricSource {
    client: YahooFinanceClient,
}

impl YahooMetricSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: YahooFinanceClient::new(timeout)?,
        })
    }
}

#[async_trait]
impl MetricSource for YahooMetricSource {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(skip(self), fields(ticker = %listing.yahoo_ticker()))]
    async fn fetch(&self, listing: &Listing, _mode: AnalysisMode) -> Result<Metrics> {
        let ticker = listing.yahoo_ticker();
        let (history, quote) = tokio::join!(
            self.client.daily_history(&ticker, HISTORY_RANGE),
            self.client.quote_summary(&ticker),
        );

        let metrics = assemble(&history?, &quote?)?;
        debug!(price = metrics.price(), "Assembled Yahoo metrics");
        Ok(metrics)
    }
}

/// Combine history and quote into a complete metric set
fn assemble(bars: &[DailyBar], quote: &QuoteSummary) -> Result<Metrics> {
    let last = bars
        .last()
        .ok_or_else(|| StockError::upstream(NAME, "empty price history"))?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dma_50 = simple_moving_average(&closes, SHORT_WINDOW)
        .map_err(|e| StockError::upstream(NAME, e.to_string()))?;
    let dma_200 = simple_moving_average(&closes, LONG_WINDOW)
        .map_err(|e| StockError::upstream(NAME, e.to_string()))?;

    let pe_ratio = quote
        .trailing_pe
        .ok_or_else(|| StockError::upstream(NAME, "missing trailing P/E"))?;

    Metrics::new(
        quote.regular_market_price.unwrap_or(last.close),
        quote.regular_market_volume.unwrap_or(last.volume),
        pe_ratio,
        dma_50,
        dma_200,
        MetricOrigin::Yahoo,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(n: usize) -> Vec<DailyBar> {
        (0..n)
            .map(|i| DailyBar {
                close: 100.0 + i as f64,
                volume: 1_000,
            })
            .collect()
    }

    fn quote(pe: Option<f64>) -> QuoteSummary {
        QuoteSummary {
            symbol: "INFY.NS".to_string(),
            regular_market_price: None,
            regular_market_volume: Some(42),
            trailing_pe: pe,
        }
    }

    #[test]
    fn test_assemble_complete() {
        let metrics = assemble(&bars(250), &quote(Some(24.5))).unwrap();
        assert_eq!(metrics.price(), 349.0);
        assert_eq!(metrics.volume(), 42);
        assert_eq!(metrics.pe_ratio(), 24.5);
        // last 50 closes are 300..=349
        assert!((metrics.dma_50() - 324.5).abs() < 1e-9);
        assert!((metrics.dma_200() - 249.5).abs() < 1e-9);
        assert_eq!(metrics.origin(), MetricOrigin::Yahoo);
    }

    #[test]
    fn test_short_history_is_incomplete() {
        let err = assemble(&bars(120), &quote(Some(24.5))).unwrap_err();
        assert!(matches!(err, StockError::UpstreamUnavailable { .. }));
    }

    #[test]
    fn test_missing_pe_is_incomplete() {
        let err = assemble(&bars(250), &quote(None)).unwrap_err();
        assert!(err.to_string().contains("trailing P/E"));
    }

    #[test]
    fn test_empty_history() {
        assert!(assemble(&[], &quote(Some(10.0))).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_live() {
        let source = YahooMetricSource::new(Duration::from_secs(10)).unwrap();
        let listing = Listing::parse("AAPL", None).unwrap();
        let metrics = source.fetch(&listing, AnalysisMode::Both).await.unwrap();
        assert!(metrics.price() > 0.0);
    }
}
