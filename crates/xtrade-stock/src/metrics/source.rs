//! The metric source capability

use crate::domain::{AnalysisMode, Metrics, Symbol};
use crate::error::Result;
use crate::market::Market;
use async_trait::async_trait;

/// A symbol together with the market it is listed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub symbol: Symbol,
    pub market: Option<Market>,
}

impl Listing {
    pub fn new(symbol: Symbol, market: Option<Market>) -> Self {
        Self { symbol, market }
    }

    /// Parse a raw identifier; fails with `InvalidSymbol`
    pub fn parse(raw: &str, market: Option<Market>) -> Result<Self> {
        Ok(Self::new(Symbol::parse(raw)?, market))
    }

    /// Ticker as Yahoo Finance spells it, e.g. `TCS.NS`
    pub fn yahoo_ticker(&self) -> String {
        self.symbol
            .with_suffix(self.market.map_or("", Market::yahoo_suffix))
    }

    /// Ticker as Alpha Vantage spells it, if the exchange is covered
    pub fn alpha_vantage_ticker(&self) -> Option<String> {
        match self.market {
            Some(market) => market
                .alpha_vantage_suffix()
                .map(|suffix| self.symbol.with_suffix(suffix)),
            None => Some(self.symbol.to_string()),
        }
    }
}

/// Provider of complete per-symbol metrics.
///
/// A source either returns every metric or fails; it never returns a partial
/// set. Timeouts are applied by the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Short identifier used in logs and error descriptors
    fn name(&self) -> &'static str;

    /// Fetch metrics for one listing
    async fn fetch(&self, listing: &Listing, mode: AnalysisMode) -> Result<Metrics>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickers_per_market() {
        let tcs = Listing::parse("tcs", Some(Market::India)).unwrap();
        assert_eq!(tcs.yahoo_ticker(), "TCS.NS");
        assert_eq!(tcs.alpha_vantage_ticker().as_deref(), Some("TCS.BSE"));

        let bhp = Listing::parse("BHP", Some(Market::Australia)).unwrap();
        assert_eq!(bhp.yahoo_ticker(), "BHP.AX");
        assert!(bhp.alpha_vantage_ticker().is_none());

        let bare = Listing::parse("AAPL", None).unwrap();
        assert_eq!(bare.yahoo_ticker(), "AAPL");
        assert_eq!(bare.alpha_vantage_ticker().as_deref(), Some("AAPL"));
    }

    #[test]
    fn test_invalid_listing() {
        assert!(Listing::parse("$$$", Some(Market::Usa)).is_err());
    }
}
