//! Suggestion engine
//!
//! Coordinates the registry, the optional ranker and the metric router for
//! one request at a time.

pub mod suggestion_engine;

pub use suggestion_engine::SuggestionEngine;
