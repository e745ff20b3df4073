//! JSON request payloads
//!
//! Accepts both the current field names and the ones older front ends send
//! (`country`, `analysisType`, `numStocks`).

use crate::domain::{AnalysisMode, DEFAULT_COUNT, SuggestionRequest};
use crate::error::{Result, StockError};
use serde::Deserialize;
use serde_json::{Number, Value, json};

const DEFAULT_MARKET: &str = "India";

/// Raw request as sent by a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionPayload {
    #[serde(default, alias = "country")]
    pub market: Option<String>,

    #[serde(default, rename = "analysisMode", alias = "analysisType", alias = "mode")]
    pub analysis_mode: Option<String>,

    /// Any JSON integer; out-of-range values are clamped later
    #[serde(default, alias = "numStocks")]
    pub count: Option<Number>,
}

impl SuggestionPayload {
    /// Parse a JSON object. Anything else is a `BadRequest`.
    pub fn from_json(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| StockError::BadRequest(format!("malformed JSON: {e}")))?;

        if !value.is_object() {
            return Err(StockError::BadRequest(
                "request must be a JSON object".to_string(),
            ));
        }

        serde_json::from_value(value)
            .map_err(|e| StockError::BadRequest(format!("invalid request: {e}")))
    }

    /// Apply defaults and validate the analysis mode; the count is clamped
    pub fn into_request(self) -> Result<SuggestionRequest> {
        let mode = match self.analysis_mode.as_deref() {
            None => AnalysisMode::default(),
            Some(raw) => raw.parse()?,
        };

        let count = match &self.count {
            None => DEFAULT_COUNT as i64,
            Some(number) => saturating_count(number)?,
        };

        Ok(SuggestionRequest::new(
            self.market.unwrap_or_else(|| DEFAULT_MARKET.to_string()),
            mode,
            count,
        ))
    }
}

/// Whole numbers saturate into `i64`, including ones written with an
/// exponent. Fractions are not a number of stocks.
fn saturating_count(number: &Number) -> Result<i64> {
    if let Some(count) = number.as_i64() {
        return Ok(count);
    }
    if number.as_u64().is_some() {
        return Ok(i64::MAX);
    }

    match number.as_f64() {
        Some(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
        _ => Err(StockError::BadRequest(format!(
            "count must be a whole number, got {number}"
        ))),
    }
}

/// Parse a JSON request body straight into a request
pub fn parse_request(input: &str) -> Result<SuggestionRequest> {
    SuggestionPayload::from_json(input)?.into_request()
}

/// Body returned to clients when a request cannot be served
pub fn error_response(err: &StockError) -> Value {
    json!({
        "error": err.to_string(),
        "stocks": [],
    })
}
