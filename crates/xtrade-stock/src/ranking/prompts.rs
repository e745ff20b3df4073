//! Prompt templates for universe ranking

use crate::domain::{AnalysisMode, Symbol};
use crate::error::{Result, StockError};
use crate::market::Market;
use minijinja::{Environment, context};

/// System prompt for the ranking model
pub const SYSTEM_PROMPT: &str = "You are an equity research assistant. \
You rank stocks from a fixed candidate list using the indicators you are asked about. \
Answer with a JSON array of ticker strings only, best candidate first, \
using only tickers from the candidate list.";

const RANK_TEMPLATE: &str = "Top {{ count }} stocks for {{ market }} based on {{ mode }} indicators.
Candidates listed on {{ exchange }}: {{ candidates | join(\", \") }}.
Order all {{ candidates | length }} candidates from most to least attractive and reply with a JSON array such as [\"{{ candidates[0] }}\", ...].";

/// Render the user prompt asking for a ranking of `universe`
pub fn rank_prompt(
    market: Market,
    mode: AnalysisMode,
    universe: &[Symbol],
    count: usize,
) -> Result<String> {
    let candidates: Vec<&str> = universe.iter().map(Symbol::as_str).collect();

    Environment::new()
        .render_str(
            RANK_TEMPLATE,
            context! {
                count => count,
                market => market.name(),
                exchange => market.exchange(),
                mode => mode.describe(),
                candidates => candidates,
            },
        )
        .map_err(|e| StockError::Ranking(format!("failed to render prompt: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::resolve_universe;

    #[test]
    fn test_rank_prompt() {
        let prompt =
            rank_prompt(Market::India, AnalysisMode::Technical, resolve_universe("India"), 5)
                .unwrap();

        assert!(prompt.starts_with("Top 5 stocks for India based on technical indicators."));
        assert!(prompt.contains("listed on NSE: RELIANCE, TCS, INFY"));
        assert!(prompt.contains("Order all 10 candidates"));
        assert!(prompt.contains("[\"RELIANCE\", ...]"));
    }

    #[test]
    fn test_rank_prompt_both_modes() {
        let prompt =
            rank_prompt(Market::Usa, AnalysisMode::Both, resolve_universe("USA"), 3).unwrap();
        assert!(prompt.contains("based on technical and fundamental indicators"));
    }
}
