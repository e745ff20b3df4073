//! LLM-backed universe ranking

use super::UniverseRanker;
use super::prompts::{SYSTEM_PROMPT, rank_prompt};
use crate::config::RankingConfig;
use crate::domain::{AnalysisMode, Symbol};
use crate::error::{Result, StockError};
use crate::market::Market;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use xtrade_llm::providers::OpenAIProvider;
use xtrade_llm::{CompletionRequest, LLMProvider, Message};

/// Asks a chat model to order the candidate list
pub struct LlmRanker {
    provider: Arc<dyn LLMProvider>,
    config: RankingConfig,
}

impl LlmRanker {
    pub fn new(provider: Arc<dyn LLMProvider>, config: RankingConfig) -> Self {
        Self { provider, config }
    }

    /// Ranker over the OpenAI-compatible provider configured by
    /// `OPENAI_API_KEY` / `OPENAI_API_BASE`
    pub fn from_env(config: RankingConfig) -> Result<Self> {
        let provider = OpenAIProvider::from_env()?;
        info!(
            api_base = %provider.config().api_base,
            model = %config.model,
            "LLM ranking enabled"
        );
        Ok(Self::new(Arc::new(provider), config))
    }
}

#[async_trait]
impl UniverseRanker for LlmRanker {
    fn name(&self) -> &'static str {
        "llm"
    }

    #[instrument(skip(self, universe), fields(model = %self.config.model, provider = self.provider.name()))]
    async fn rank(
        &self,
        market: Market,
        mode: AnalysisMode,
        universe: &[Symbol],
        count: usize,
    ) -> Result<Vec<String>> {
        let prompt = rank_prompt(market, mode, universe, count)?;

        let request = CompletionRequest::builder(&self.config.model)
            .system(SYSTEM_PROMPT)
            .add_message(Message::user(prompt))
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build();

        let response = self.provider.complete(request).await.map_err(|e| {
            warn!(transient = e.is_transient(), error = %e, "Ranking completion failed");
            StockError::from(e)
        })?;
        debug!(tokens = response.usage.total(), "Ranking completion received");

        extract_tickers(response.message.text())
    }
}

/// Pull the first non-empty JSON array of strings out of a model reply.
///
/// Models often wrap the array in prose or code fences, and bracketed notes
/// such as "[by momentum]" may come before it.
pub fn extract_tickers(reply: &str) -> Result<Vec<String>> {
    let pattern = regex::Regex::new(r"(?s)\[.*?\]")
        .map_err(|e| StockError::Ranking(e.to_string()))?;

    let mut last_error = None;
    for candidate in pattern.find_iter(reply) {
        match serde_json::from_str::<Vec<String>>(candidate.as_str()) {
            Ok(tickers) if !tickers.is_empty() => return Ok(tickers),
            Ok(_) => last_error = Some("empty ranking".to_string()),
            Err(e) => last_error = Some(format!("unparsable ranking: {e}")),
        }
    }

    Err(StockError::Ranking(
        last_error.unwrap_or_else(|| "reply contains no JSON array".to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::resolve_universe;
    use xtrade_llm::{CompletionResponse, LLMError, StopReason, TokenUsage};

    struct CannedProvider {
        reply: std::result::Result<String, ()>,
    }

    #[async_trait]
    impl LLMProvider for CannedProvider {
        async fn complete(&self, request: CompletionRequest) -> xtrade_llm::Result<CompletionResponse> {
            assert_eq!(request.system.as_deref(), Some(SYSTEM_PROMPT));
            assert!(request.messages[0].text().starts_with("Top 3 stocks for USA"));

            match &self.reply {
                Ok(text) => Ok(CompletionResponse {
                    message: Message::assistant(text.clone()),
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                }),
                Err(()) => Err(LLMError::RateLimitExceeded("slow down".to_string())),
            }
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn ranker(reply: std::result::Result<&str, ()>) -> LlmRanker {
        LlmRanker::new(
            Arc::new(CannedProvider {
                reply: reply.map(str::to_string),
            }),
            RankingConfig::new("test-model"),
        )
    }

    #[test]
    fn test_extract_plain_array() {
        let tickers = extract_tickers(r#"["NVDA", "MSFT"]"#).unwrap();
        assert_eq!(tickers, ["NVDA", "MSFT"]);
    }

    #[test]
    fn test_extract_from_prose() {
        let reply = "Here is my ranking:\n```json\n[\"TCS\",\n \"INFY\"]\n```\nThe [rest] is noise.";
        assert_eq!(extract_tickers(reply).unwrap(), ["TCS", "INFY"]);
    }

    #[test]
    fn test_extract_skips_bracketed_notes() {
        let reply = "Ranking [by momentum]:\n[\"NVDA\", \"MSFT\"]";
        assert_eq!(extract_tickers(reply).unwrap(), ["NVDA", "MSFT"]);

        let reply = "[Note] prices are delayed. [] none excluded. [\"CBA\"]";
        assert_eq!(extract_tickers(reply).unwrap(), ["CBA"]);
    }

    #[test]
    fn test_extract_failures() {
        assert!(matches!(extract_tickers("no idea"), Err(StockError::Ranking(_))));
        assert!(extract_tickers("[]").is_err());
        assert!(extract_tickers("[1, 2]").is_err());
    }

    #[tokio::test]
    async fn test_rank_through_provider() {
        let universe = resolve_universe("USA");
        let tickers = ranker(Ok("[\"JPM\", \"V\"]"))
            .rank(Market::Usa, AnalysisMode::Fundamental, universe, 3)
            .await
            .unwrap();
        assert_eq!(tickers, ["JPM", "V"]);
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_ranking() {
        let universe = resolve_universe("USA");
        let err = ranker(Err(()))
            .rank(Market::Usa, AnalysisMode::Both, universe, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::Ranking(_)));
    }
}
