//! Bounded random metrics for when no live source answers

use super::source::{Listing, MetricSource};
use crate::domain::{AnalysisMode, MetricOrigin, Metrics};
use crate::error::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// Price range, also used for both moving averages
pub const PRICE_RANGE: Range<f64> = 50.0..1050.0;
/// Daily volume range
pub const VOLUME_RANGE: Range<u64> = 0..10_000_000;
/// P/E range
pub const PE_RANGE: Range<f64> = 5.0..35.0;

/// Always-available source producing plausible, clearly labelled values.
///
/// Unseeded sources draw from the thread RNG. Seeded sources derive one RNG
/// per symbol, so the same symbol always gets the same numbers.
#[derive(Debug, Clone, Default)]
pub struct SyntheticMetricSource {
    seed: Option<u64>,
}

impl SyntheticMetricSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic variant for reproducible output
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Generate metrics synchronously
    pub fn generate(&self, listing: &Listing) -> Result<Metrics> {
        match self.seed {
            Some(seed) => {
                let mut hasher = DefaultHasher::new();
                listing.symbol.hash(&mut hasher);
                draw(&mut StdRng::seed_from_u64(seed ^ hasher.finish()))
            }
            None => draw(&mut rand::thread_rng()),
        }
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R) -> Result<Metrics> {
    Metrics::new(
        rng.gen_range(PRICE_RANGE),
        rng.gen_range(VOLUME_RANGE),
        rng.gen_range(PE_RANGE),
        rng.gen_range(PRICE_RANGE),
        rng.gen_range(PRICE_RANGE),
        MetricOrigin::Synthetic,
    )
}

#[async_trait]
impl MetricSource for SyntheticMetricSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch(&self, listing: &Listing, _mode: AnalysisMode) -> Result<Metrics> {
        self.generate(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(raw: &str) -> Listing {
        Listing::parse(raw, None).unwrap()
    }

    #[test]
    fn test_values_within_bounds() {
        let source = SyntheticMetricSource::new();
        for _ in 0..500 {
            let m = source.generate(&listing("RELIANCE")).unwrap();
            assert!(PRICE_RANGE.contains(&m.price()));
            assert!(VOLUME_RANGE.contains(&m.volume()));
            assert!(PE_RANGE.contains(&m.pe_ratio()));
            assert!(PRICE_RANGE.contains(&m.dma_50()));
            assert!(PRICE_RANGE.contains(&m.dma_200()));
            assert_eq!(m.origin(), MetricOrigin::Synthetic);
        }
    }

    #[test]
    fn test_seeded_is_deterministic_per_symbol() {
        let source = SyntheticMetricSource::seeded(7);
        let a = source.generate(&listing("AAPL")).unwrap();
        let b = source.generate(&listing("AAPL")).unwrap();
        let c = source.generate(&listing("MSFT")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fetch_never_fails() {
        let source = SyntheticMetricSource::new();
        for raw in ["CBA", "BHP", "TCS", "V"] {
            let fetched = tokio_test::block_on(source.fetch(&listing(raw), AnalysisMode::Fundamental));
            assert!(fetched.is_ok());
        }
    }
}
