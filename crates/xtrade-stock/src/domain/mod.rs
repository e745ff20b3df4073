//! Request-scoped domain values

pub mod models;
pub mod symbol;

pub use models::{
    AnalysisMode, DEFAULT_COUNT, MAX_COUNT, MIN_COUNT, MetricField, MetricOrigin, Metrics,
    Outcome, RankedBy, SuggestionRequest, SuggestionResult, SymbolRecord, clamp_count,
};
pub use symbol::Symbol;
