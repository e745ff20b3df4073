//! Request pipeline: clamp, resolve, rank, truncate, fetch

use crate::config::StockConfig;
use crate::domain::{RankedBy, SuggestionRequest, SuggestionResult, Symbol};
use crate::error::Result;
use crate::interface::payload::parse_request;
use crate::market::{Market, registry};
use crate::metrics::MetricRouter;
use crate::ranking::{LlmRanker, UniverseRanker, reconcile};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Stateless suggestion engine; one instance can serve concurrent requests
#[derive(Clone)]
pub struct SuggestionEngine {
    router: MetricRouter,
    ranker: Option<Arc<dyn UniverseRanker>>,
    ranking_timeout: Duration,
}

impl SuggestionEngine {
    /// Engine without ranking
    pub fn new(router: MetricRouter) -> Self {
        Self {
            router,
            ranker: None,
            ranking_timeout: StockConfig::default().ranking_timeout,
        }
    }

    /// Reorder universes with `ranker`, giving up after `timeout`
    pub fn with_ranker(mut self, ranker: Arc<dyn UniverseRanker>, timeout: Duration) -> Self {
        self.ranker = Some(ranker);
        self.ranking_timeout = timeout;
        self
    }

    /// Build the engine described by `config`.
    ///
    /// A ranking section whose provider cannot be set up disables ranking
    /// instead of failing.
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        let engine = Self::new(MetricRouter::from_config(config)?);

        let Some(ranking) = &config.ranking else {
            return Ok(engine);
        };

        match LlmRanker::from_env(ranking.clone()) {
            Ok(ranker) => Ok(engine.with_ranker(Arc::new(ranker), config.ranking_timeout)),
            Err(e) => {
                warn!(error = %e, "LLM ranking disabled");
                Ok(engine)
            }
        }
    }

    pub fn router(&self) -> &MetricRouter {
        &self.router
    }

    /// Name of the configured ranker, if any
    pub fn ranker_name(&self) -> Option<&'static str> {
        self.ranker.as_ref().map(|r| r.name())
    }

    /// Produce suggestions for a well-formed request. Never fails: unknown
    /// markets give an empty result and per-symbol failures become error
    /// records.
    #[instrument(skip(self), fields(market = %request.market, mode = %request.mode, count = request.count()))]
    pub async fn suggest(&self, request: &SuggestionRequest) -> SuggestionResult {
        let Ok(market) = request.market.parse::<Market>() else {
            info!("Unknown market, returning empty result");
            return SuggestionResult::empty(request);
        };

        let universe = registry().universe(market);
        if universe.is_empty() {
            return SuggestionResult::empty(request);
        }

        let (ordered, ranked_by) = self.order(market, request, universe).await;

        let selected: Vec<&str> = ordered
            .iter()
            .take(request.count())
            .map(Symbol::as_str)
            .collect();

        let records = self
            .router
            .fetch_metrics_batch(&selected, Some(market), request.mode)
            .await;

        let failed = records.iter().filter(|r| r.is_error()).count();
        info!(
            returned = records.len(),
            failed,
            ranked_by = ranked_by.as_str(),
            "Suggestions assembled"
        );

        SuggestionResult {
            request_id: Uuid::new_v4(),
            market: market.name().to_string(),
            exchange: Some(market.exchange()),
            analysis_mode: request.mode,
            ranked_by,
            generated_at: Utc::now(),
            records,
        }
    }

    /// Parse a JSON request payload and run it.
    ///
    /// The only failure is `BadRequest` for an unusable payload.
    pub async fn suggest_payload(&self, payload: &str) -> Result<SuggestionResult> {
        let request = parse_request(payload)?;
        Ok(self.suggest(&request).await)
    }

    async fn order(
        &self,
        market: Market,
        request: &SuggestionRequest,
        universe: &[Symbol],
    ) -> (Vec<Symbol>, RankedBy) {
        let Some(ranker) = &self.ranker else {
            return (universe.to_vec(), RankedBy::Registry);
        };

        let ranking = tokio::time::timeout(
            self.ranking_timeout,
            ranker.rank(market, request.mode, universe, request.count()),
        )
        .await;

        match ranking {
            Ok(Ok(ranked)) => (
                reconcile(universe, &ranked),
                RankedBy::Ranker(ranker.name().to_string()),
            ),
            Ok(Err(e)) => {
                warn!(ranker = ranker.name(), error = %e, "Ranking failed, keeping registry order");
                (universe.to_vec(), RankedBy::Registry)
            }
            Err(_) => {
                warn!(
                    ranker = ranker.name(),
                    timeout_ms = self.ranking_timeout.as_millis() as u64,
                    "Ranking timed out, keeping registry order"
                );
                (universe.to_vec(), RankedBy::Registry)
            }
        }
    }
}
