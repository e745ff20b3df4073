//! Metric sources and the fallback chain in front of them

pub mod alpha_vantage;
pub mod router;
pub mod source;
pub mod synthetic;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageMetricSource;
pub use router::MetricRouter;
pub use source::{Listing, MetricSource};
pub use synthetic::SyntheticMetricSource;
pub use yahoo::YahooMetricSource;
