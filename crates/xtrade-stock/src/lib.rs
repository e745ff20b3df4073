//! Stock suggestion engine
//!
//! This crate recommends a bounded set of equities for a national market and
//! returns per-symbol metrics for display. It includes:
//!
//! - A curated market registry (India, USA, Australia)
//! - Metric sources: Yahoo Finance, Alpha Vantage and a synthetic fallback
//! - A router that walks the sources with per-call timeouts
//! - Optional LLM ranking of the universe before truncation
//! - JSON request/response payloads plus table, JSON and CSV output
//!
//! # Architecture
//!
//! `SuggestionEngine::suggest` clamps the requested count, resolves the
//! market universe, optionally asks a `UniverseRanker` for an order, keeps the
//! first N symbols and hands them to the `MetricRouter`. The router fetches
//! symbols concurrently and turns any per-symbol failure into an error record,
//! so a well-formed request always produces a result.
//!
//! # Example
//!
//! ```rust,no_run
//! use xtrade_stock::{AnalysisMode, StockConfig, SuggestionEngine, SuggestionRequest};
//!
//! #[tokio::main]
//! async fn main() -> xtrade_stock::Result<()> {
//!     let config = StockConfig::builder().with_env_api_key().build()?;
//!     let engine = SuggestionEngine::from_config(&config)?;
//!
//!     let request = SuggestionRequest::new("India", AnalysisMode::Both, 5);
//!     let result = engine.suggest(&request).await;
//!     for record in &result.records {
//!         println!("{} {:?}", record.symbol(), record.metrics().map(|m| m.price()));
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod interface;
pub mod market;
pub mod metrics;
pub mod ranking;

// Re-export main types for convenience
pub use config::{RankingConfig, StockConfig};
pub use domain::{
    AnalysisMode, MetricOrigin, Metrics, RankedBy, SuggestionRequest, SuggestionResult, Symbol,
    SymbolRecord,
};
pub use engine::SuggestionEngine;
pub use error::{Result, StockError};
pub use interface::{FormatterFactory, OutputFormat, SuggestionPayload, parse_request};
pub use market::{Market, resolve_universe};
pub use metrics::{MetricRouter, MetricSource};
pub use ranking::{LlmRanker, UniverseRanker};
