//! Live metrics from Alpha Vantage

use super::source::{Listing, MetricSource};
use crate::api::{AlphaVantageClient, CompanyOverview, GlobalQuote};
use crate::domain::{AnalysisMode, MetricOrigin, Metrics};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

const NAME: &str = "alpha_vantage";

/// GLOBAL_QUOTE for price and volume, OVERVIEW for P/E and moving averages
#[derive(Debug, Clone)]
pub struct AlphaVantageMetricSource {
    client: AlphaVantageClient,
}

impl AlphaVantageMetricSource {
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: AlphaVantageClient::new(api_key, rate_limit, timeout)?,
        })
    }
}

#[async_trait]
impl MetricSource for AlphaVantageMetricSource {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(skip(self), fields(symbol = %listing.symbol))]
    async fn fetch(&self, listing: &Listing, _mode: AnalysisMode) -> Result<Metrics> {
        let ticker = listing.alpha_vantage_ticker().ok_or_else(|| {
            StockError::upstream(NAME, format!("exchange not covered for {}", listing.symbol))
        })?;

        // Both calls draw from the same request quota
        let quote = self.client.global_quote(&ticker).await?;
        let overview = self.client.company_overview(&ticker).await?;

        assemble(&quote, &overview)
    }
}

fn assemble(quote: &GlobalQuote, overview: &CompanyOverview) -> Result<Metrics> {
    let missing = |what: &str| StockError::upstream(NAME, format!("missing {what}"));

    Metrics::new(
        quote.price().ok_or_else(|| missing("price"))?,
        quote.volume().ok_or_else(|| missing("volume"))?,
        overview.pe_ratio().ok_or_else(|| missing("P/E ratio"))?,
        overview.dma_50().ok_or_else(|| missing("50-day average"))?,
        overview.dma_200().ok_or_else(|| missing("200-day average"))?,
        MetricOrigin::AlphaVantage,
    )
}
