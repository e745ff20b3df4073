//! Metrics, records, requests and results

use crate::error::{Result, StockError};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Smallest number of suggestions a request can ask for
pub const MIN_COUNT: usize = 1;
/// Largest number of suggestions a request can ask for
pub const MAX_COUNT: usize = 20;
/// Suggestions returned when a request does not say
pub const DEFAULT_COUNT: usize = 10;

/// Clamp a requested count into `MIN_COUNT..=MAX_COUNT`.
pub fn clamp_count(count: i64) -> usize {
    usize::try_from(count.max(0))
        .unwrap_or(MAX_COUNT)
        .clamp(MIN_COUNT, MAX_COUNT)
}

/// Which family of indicators the caller cares about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Price action and moving averages
    Technical,
    /// Valuation
    Fundamental,
    /// Everything
    #[default]
    Both,
}

impl AnalysisMode {
    /// All modes in menu order
    pub const ALL: [AnalysisMode; 3] = [Self::Technical, Self::Fundamental, Self::Both];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Fundamental => "fundamental",
            Self::Both => "both",
        }
    }

    /// Metrics meaningful for display under this mode
    pub fn fields(self) -> &'static [MetricField] {
        match self {
            Self::Technical => &[
                MetricField::Price,
                MetricField::Volume,
                MetricField::Dma50,
                MetricField::Dma200,
            ],
            Self::Fundamental => &[MetricField::Price, MetricField::PeRatio],
            Self::Both => &MetricField::ALL,
        }
    }

    /// Wording used in prompts, e.g. "technical" or "technical and fundamental"
    pub fn describe(self) -> &'static str {
        match self {
            Self::Both => "technical and fundamental",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technical" | "tech" => Ok(Self::Technical),
            "fundamental" | "fund" => Ok(Self::Fundamental),
            "both" | "all" => Ok(Self::Both),
            other => Err(StockError::BadRequest(format!(
                "unknown analysis mode '{other}', expected technical, fundamental or both"
            ))),
        }
    }
}

/// A single displayed metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    Price,
    Volume,
    PeRatio,
    Dma50,
    Dma200,
}

impl MetricField {
    pub const ALL: [MetricField; 5] = [
        Self::Price,
        Self::Volume,
        Self::PeRatio,
        Self::Dma50,
        Self::Dma200,
    ];

    /// Column header, also the key in JSON responses
    pub fn header(self) -> &'static str {
        match self {
            Self::Price => "Price",
            Self::Volume => "Volume",
            Self::PeRatio => "PE Ratio",
            Self::Dma50 => "50DMA",
            Self::Dma200 => "200DMA",
        }
    }
}

/// Where a set of metrics came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricOrigin {
    Yahoo,
    AlphaVantage,
    Synthetic,
}

impl MetricOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "Yahoo Finance",
            Self::AlphaVantage => "Alpha Vantage",
            Self::Synthetic => "Synthetic",
        }
    }

    /// Whether the numbers came from a real market data provider
    pub fn is_live(self) -> bool {
        !matches!(self, Self::Synthetic)
    }
}

impl fmt::Display for MetricOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete, validated metric set for one symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    price: f64,
    volume: u64,
    pe_ratio: f64,
    dma_50: f64,
    dma_200: f64,
    origin: MetricOrigin,
}

impl Metrics {
    /// Build a metric set, rejecting non-finite or non-positive values.
    pub fn new(
        price: f64,
        volume: u64,
        pe_ratio: f64,
        dma_50: f64,
        dma_200: f64,
        origin: MetricOrigin,
    ) -> Result<Self> {
        for (name, value) in [
            ("price", price),
            ("pe ratio", pe_ratio),
            ("50-day average", dma_50),
            ("200-day average", dma_200),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(StockError::upstream(
                    origin.as_str(),
                    format!("{name} out of range: {value}"),
                ));
            }
        }

        Ok(Self {
            price,
            volume,
            pe_ratio,
            dma_50,
            dma_200,
            origin,
        })
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn pe_ratio(&self) -> f64 {
        self.pe_ratio
    }

    pub fn dma_50(&self) -> f64 {
        self.dma_50
    }

    pub fn dma_200(&self) -> f64 {
        self.dma_200
    }

    pub fn origin(&self) -> MetricOrigin {
        self.origin
    }

    /// Numeric value of a field; volume is widened to `f64`
    pub fn value(&self, field: MetricField) -> f64 {
        match field {
            MetricField::Price => self.price,
            MetricField::Volume => self.volume as f64,
            MetricField::PeRatio => self.pe_ratio,
            MetricField::Dma50 => self.dma_50,
            MetricField::Dma200 => self.dma_200,
        }
    }
}

/// Either a full metric set or the reason none could be produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Metrics(Metrics),
    Error(String),
}

/// One row of a suggestion result
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRecord {
    symbol: String,
    outcome: Outcome,
}

impl SymbolRecord {
    pub fn with_metrics(symbol: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            symbol: symbol.into(),
            outcome: Outcome::Metrics(metrics),
        }
    }

    pub fn with_error(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            outcome: Outcome::Error(error.into()),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        match &self.outcome {
            Outcome::Metrics(m) => Some(m),
            Outcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Error(e) => Some(e),
            Outcome::Metrics(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}

// Flat shape consumed by the presentation layer: every numeric key is always
// present, null on error records.
impl Serialize for SymbolRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(8))?;
        map.serialize_entry("Symbol", &self.symbol)?;

        let metrics = self.metrics();
        map.serialize_entry(MetricField::Price.header(), &metrics.map(Metrics::price))?;
        map.serialize_entry(MetricField::Volume.header(), &metrics.map(Metrics::volume))?;
        map.serialize_entry(MetricField::PeRatio.header(), &metrics.map(Metrics::pe_ratio))?;
        map.serialize_entry(MetricField::Dma50.header(), &metrics.map(Metrics::dma_50))?;
        map.serialize_entry(MetricField::Dma200.header(), &metrics.map(Metrics::dma_200))?;
        map.serialize_entry("Source", &metrics.map(|m| m.origin().as_str()))?;
        map.serialize_entry("Error", &self.error())?;
        map.end()
    }
}

/// Validated suggestion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    /// Raw market selector; unknown markets are not an error
    pub market: String,
    pub mode: AnalysisMode,
    count: usize,
}

impl SuggestionRequest {
    /// Create a request; `count` is clamped, never rejected.
    pub fn new(market: impl Into<String>, mode: AnalysisMode, count: i64) -> Self {
        Self {
            market: market.into(),
            mode,
            count: clamp_count(count),
        }
    }

    /// Requested number of suggestions, always within `MIN_COUNT..=MAX_COUNT`
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Default for SuggestionRequest {
    fn default() -> Self {
        Self::new("India", AnalysisMode::Both, DEFAULT_COUNT as i64)
    }
}

/// How the universe was ordered before truncation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankedBy {
    /// Curated registry order
    Registry,
    /// Reordered by the named ranker
    Ranker(String),
}

impl RankedBy {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Registry => "registry",
            Self::Ranker(name) => name,
        }
    }
}

impl Serialize for RankedBy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Ordered suggestions plus request metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResult {
    pub request_id: Uuid,
    pub market: String,
    pub exchange: Option<&'static str>,
    pub analysis_mode: AnalysisMode,
    pub ranked_by: RankedBy,
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "stocks")]
    pub records: Vec<SymbolRecord>,
}

impl SuggestionResult {
    /// Result with no records, used for unknown markets
    pub fn empty(request: &SuggestionRequest) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            market: request.market.clone(),
            exchange: None,
            analysis_mode: request.mode,
            ranked_by: RankedBy::Registry,
            generated_at: Utc::now(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(SymbolRecord::symbol)
    }

    /// Records that carry an error instead of metrics
    pub fn failures(&self) -> impl Iterator<Item = &SymbolRecord> {
        self.records.iter().filter(|r| r.is_error())
    }
}
