//! Optional reordering of a market universe before truncation

pub mod llm;
pub mod prompts;

pub use llm::LlmRanker;

use crate::domain::{AnalysisMode, Symbol};
use crate::error::Result;
use crate::market::Market;
use async_trait::async_trait;
use std::collections::HashSet;

/// Source of a preferred ordering for a universe
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniverseRanker: Send + Sync {
    /// Name reported in results
    fn name(&self) -> &'static str;

    /// Tickers in preferred order. The answer may be partial or contain
    /// unknown tickers; callers reconcile it against the universe.
    async fn rank(
        &self,
        market: Market,
        mode: AnalysisMode,
        universe: &[Symbol],
        count: usize,
    ) -> Result<Vec<String>>;
}

/// Turn a ranker's answer into a permutation of `universe`.
///
/// Known tickers keep the ranker's order (first occurrence wins), exchange
/// suffixes such as `.NS` are ignored, unknown tickers are dropped and any
/// symbol the ranker left out follows in registry order.
pub fn reconcile(universe: &[Symbol], ranked: &[String]) -> Vec<Symbol> {
    let mut seen = HashSet::with_capacity(universe.len());
    let mut ordered = Vec::with_capacity(universe.len());

    for raw in ranked {
        let candidate = raw.trim().to_ascii_uppercase();
        let matched = universe.iter().find(|s| {
            candidate == s.as_str()
                || candidate
                    .strip_prefix(s.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        });
        if let Some(symbol) = matched {
            if seen.insert(symbol.as_str()) {
                ordered.push(symbol.clone());
            }
        }
    }

    ordered.extend(
        universe
            .iter()
            .filter(|s| !seen.contains(s.as_str()))
            .cloned(),
    );
    ordered
}
