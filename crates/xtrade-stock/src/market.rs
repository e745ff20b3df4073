//! Supported markets and their curated symbol universes
//!
//! The registry is built once per process and only read afterwards, so it can
//! be shared across concurrent requests without synchronization.

use crate::domain::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// A supported national market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    India,
    #[serde(rename = "USA")]
    Usa,
    Australia,
}

impl Market {
    /// All markets in display order
    pub const ALL: [Market; 3] = [Self::India, Self::Usa, Self::Australia];

    /// Canonical selector name
    pub fn name(self) -> &'static str {
        match self {
            Self::India => "India",
            Self::Usa => "USA",
            Self::Australia => "Australia",
        }
    }

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            Self::India => "🇮🇳 India",
            Self::Usa => "🇺🇸 USA",
            Self::Australia => "🇦🇺 Australia",
        }
    }

    /// Primary exchange the universe is drawn from
    pub fn exchange(self) -> &'static str {
        match self {
            Self::India => "NSE",
            Self::Usa => "NASDAQ",
            Self::Australia => "ASX",
        }
    }

    /// Suffix Yahoo Finance expects after the ticker
    pub fn yahoo_suffix(self) -> &'static str {
        match self {
            Self::India => ".NS",
            Self::Usa => "",
            Self::Australia => ".AX",
        }
    }

    /// Suffix Alpha Vantage expects, `None` when the exchange is not covered
    pub fn alpha_vantage_suffix(self) -> Option<&'static str> {
        match self {
            Self::India => Some(".BSE"),
            Self::Usa => Some(""),
            Self::Australia => None,
        }
    }

    fn tickers(self) -> &'static [&'static str] {
        match self {
            Self::India => &[
                "RELIANCE",
                "TCS",
                "INFY",
                "HDFCBANK",
                "ICICIBANK",
                "SBIN",
                "BHARTIARTL",
                "HINDUNILVR",
                "KOTAKBANK",
                "LT",
            ],
            Self::Usa => &[
                "AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA", "JPM", "V", "UNH",
            ],
            Self::Australia => &[
                "CBA", "BHP", "WBC", "NAB", "ANZ", "WES", "MQG", "CSL", "FMG", "WOW",
            ],
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "india" | "in" | "ind" | "nse" => Ok(Self::India),
            "usa" | "us" | "united states" | "nasdaq" => Ok(Self::Usa),
            "australia" | "au" | "aus" | "asx" => Ok(Self::Australia),
            other => Err(format!("unsupported market '{other}'")),
        }
    }
}

/// Immutable market to universe mapping
#[derive(Debug)]
pub struct MarketRegistry {
    universes: Vec<(Market, Vec<Symbol>)>,
}

impl MarketRegistry {
    fn build() -> Self {
        let universes = Market::ALL
            .into_iter()
            .map(|market| {
                let symbols = market
                    .tickers()
                    .iter()
                    .filter_map(|t| Symbol::parse(t).ok())
                    .collect();
                (market, symbols)
            })
            .collect();
        Self { universes }
    }

    /// Universe of a known market, in curated order
    pub fn universe(&self, market: Market) -> &[Symbol] {
        self.universes
            .iter()
            .find(|(m, _)| *m == market)
            .map(|(_, symbols)| symbols.as_slice())
            .unwrap_or_default()
    }

    /// Universe for a raw selector; unknown selectors yield an empty slice
    pub fn resolve(&self, selector: &str) -> &[Symbol] {
        match selector.parse::<Market>() {
            Ok(market) => self.universe(market),
            Err(_) => &[],
        }
    }

    /// Markets with a universe, in display order
    pub fn markets(&self) -> impl Iterator<Item = Market> + '_ {
        self.universes.iter().map(|(m, _)| *m)
    }
}

static REGISTRY: LazyLock<MarketRegistry> = LazyLock::new(MarketRegistry::build);

/// Process-wide registry
pub fn registry() -> &'static MarketRegistry {
    &REGISTRY
}

/// Resolve a market selector to its symbol universe.
///
/// Any string is accepted. Unknown markets resolve to an empty slice rather
/// than an error.
pub fn resolve_universe(selector: &str) -> &'static [Symbol] {
    registry().resolve(selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(symbols: &[Symbol]) -> Vec<&str> {
        symbols.iter().map(Symbol::as_str).collect()
    }

    #[test]
    fn test_every_market_has_universe() {
        for market in Market::ALL {
            let universe = registry().universe(market);
            assert_eq!(universe.len(), 10, "{market} universe size");
        }
        assert_eq!(registry().markets().count(), 3);
    }

    #[test]
    fn test_universe_order() {
        let india = names(resolve_universe("India"));
        assert_eq!(india[0], "RELIANCE");
        assert_eq!(india[1], "TCS");
        assert_eq!(india[9], "LT");

        assert_eq!(
            names(resolve_universe("USA")),
            ["AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA", "JPM", "V", "UNH"]
        );
        assert_eq!(names(resolve_universe("Australia"))[0], "CBA");
    }

    #[test]
    fn test_resolution_is_stable() {
        assert_eq!(resolve_universe("India"), resolve_universe("india"));
        assert_eq!(resolve_universe(" us "), resolve_universe("USA"));
        assert!(std::ptr::eq(resolve_universe("AU"), resolve_universe("Australia")));
    }

    #[test]
    fn test_unknown_market_is_empty() {
        assert!(resolve_universe("Mars").is_empty());
        assert!(resolve_universe("").is_empty());
    }

    #[test]
    fn test_market_metadata() {
        assert_eq!(Market::India.exchange(), "NSE");
        assert_eq!(Market::Usa.exchange(), "NASDAQ");
        assert_eq!(Market::Australia.exchange(), "ASX");
        assert_eq!(Market::India.yahoo_suffix(), ".NS");
        assert_eq!(Market::Australia.yahoo_suffix(), ".AX");
        assert_eq!(Market::India.alpha_vantage_suffix(), Some(".BSE"));
        assert!(Market::Australia.alpha_vantage_suffix().is_none());
        assert_eq!("nasdaq".parse::<Market>().unwrap(), Market::Usa);
        assert!("mars".parse::<Market>().is_err());
    }
}
