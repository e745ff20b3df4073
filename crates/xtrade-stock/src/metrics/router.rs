//! Ordered source chain with per-call timeouts
//!
//! Sources are tried in order until one yields a complete metric set. When
//! every source fails the symbol still gets a record, carrying the joined
//! failure of each source instead of numbers. Upstream failures never escape
//! the router.

use super::alpha_vantage::AlphaVantageMetricSource;
use super::source::{Listing, MetricSource};
use super::synthetic::SyntheticMetricSource;
use super::yahoo::YahooMetricSource;
use crate::config::StockConfig;
use crate::domain::{AnalysisMode, SymbolRecord};
use crate::error::{Result, StockError};
use crate::market::Market;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Routes metric requests through the configured sources
#[derive(Clone)]
pub struct MetricRouter {
    sources: Vec<Arc<dyn MetricSource>>,
    timeout: Duration,
    max_concurrency: usize,
}

impl std::fmt::Debug for MetricRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRouter")
            .field("sources", &self.source_names())
            .field("timeout", &self.timeout)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

impl MetricRouter {
    /// Router over an explicit chain
    pub fn new(
        sources: Vec<Arc<dyn MetricSource>>,
        timeout: Duration,
        max_concurrency: usize,
    ) -> Result<Self> {
        if sources.is_empty() {
            return Err(StockError::ConfigError(
                "at least one metric source is required".to_string(),
            ));
        }

        Ok(Self {
            sources,
            timeout,
            max_concurrency: max_concurrency.max(1),
        })
    }

    /// Chain by availability: Yahoo, then Alpha Vantage when a key is set,
    /// then the synthetic fallback when enabled.
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        config.validate()?;

        let mut sources: Vec<Arc<dyn MetricSource>> = Vec::new();

        if config.live_enabled() {
            sources.push(Arc::new(YahooMetricSource::new(config.request_timeout)?));

            if let Some(key) = &config.alpha_vantage_api_key {
                sources.push(Arc::new(AlphaVantageMetricSource::new(
                    key.clone(),
                    config.alpha_vantage_rate_limit,
                    config.request_timeout,
                )?));
            }
        }

        if config.synthetic_fallback {
            sources.push(Arc::new(SyntheticMetricSource::new()));
        }

        let router = Self::new(sources, config.request_timeout, config.max_concurrency)?;
        info!(sources = ?router.source_names(), "Metric router ready");
        Ok(router)
    }

    /// Names of the chained sources, in order
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Metrics for one raw symbol without market context.
    ///
    /// Fails only with `InvalidSymbol`; source failures become an error
    /// record.
    pub async fn fetch_metrics(&self, symbol: &str, mode: AnalysisMode) -> Result<SymbolRecord> {
        let listing = Listing::parse(symbol, None)?;
        Ok(self.fetch_listing(&listing, mode).await)
    }

    /// Metrics for many symbols, in input order.
    ///
    /// At most `max_concurrency` symbols are in flight. A malformed symbol
    /// only affects its own record.
    pub async fn fetch_metrics_batch<S>(
        &self,
        symbols: &[S],
        market: Option<Market>,
        mode: AnalysisMode,
    ) -> Vec<SymbolRecord>
    where
        S: AsRef<str> + Sync,
    {
        stream::iter(symbols.iter().map(|raw| async move {
            let raw = raw.as_ref();
            match Listing::parse(raw, market) {
                Ok(listing) => self.fetch_listing(&listing, mode).await,
                Err(e) => {
                    warn!(symbol = raw, error = %e, "Skipping malformed symbol");
                    SymbolRecord::with_error(raw.trim(), e.to_string())
                }
            }
        }))
        .buffered(self.max_concurrency)
        .collect()
        .await
    }

    /// Walk the chain for a parsed listing
    #[instrument(skip(self), fields(symbol = %listing.symbol))]
    pub async fn fetch_listing(&self, listing: &Listing, mode: AnalysisMode) -> SymbolRecord {
        let mut failures = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let outcome = tokio::time::timeout(self.timeout, source.fetch(listing, mode)).await;

            let reason = match outcome {
                Ok(Ok(metrics)) => {
                    if !failures.is_empty() {
                        warn!(
                            source = source.name(),
                            failed = failures.len(),
                            "Fell back after failed attempt(s)"
                        );
                    }
                    return SymbolRecord::with_metrics(listing.symbol.as_str(), metrics);
                }
                Ok(Err(e)) => failure_reason(&e),
                Err(_) => format!("timed out after {}ms", self.timeout.as_millis()),
            };

            debug!(source = source.name(), %reason, "Source failed");
            failures.push(format!("{} error: {reason}", source.name()));
        }

        let joined = failures.join(" | ");
        warn!(error = %joined, "All metric sources failed");
        SymbolRecord::with_error(listing.symbol.as_str(), joined)
    }
}

fn failure_reason(err: &StockError) -> String {
    match err {
        StockError::UpstreamUnavailable { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
