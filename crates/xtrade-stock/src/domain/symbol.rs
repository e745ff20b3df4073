//! Validated ticker symbols

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const MAX_SYMBOL_LEN: usize = 15;

/// Normalized ticker as listed on its home exchange (no Yahoo suffix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_ascii_uppercase();

        let Some(first) = normalized.chars().next() else {
            return Err(StockError::InvalidSymbol("empty symbol".to_string()));
        };

        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(StockError::InvalidSymbol(format!(
                "{normalized}: {len} characters, at most {MAX_SYMBOL_LEN} allowed"
            )));
        }

        if !first.is_ascii_alphabetic() {
            return Err(StockError::InvalidSymbol(format!(
                "{normalized}: must start with a letter"
            )));
        }

        if let Some((index, ch)) = normalized
            .char_indices()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '&')))
        {
            return Err(StockError::InvalidSymbol(format!(
                "{normalized}: invalid character '{ch}' at {index}"
            )));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ticker with an exchange suffix such as `.NS`
    pub fn with_suffix(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.0)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = StockError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = StockError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_and_normalizes() {
        assert_eq!(Symbol::parse(" reliance ").unwrap().as_str(), "RELIANCE");
        assert_eq!(Symbol::parse("brk.b").unwrap().as_str(), "BRK.B");
        assert_eq!(Symbol::parse("M&M").unwrap().as_str(), "M&M");
        assert_eq!(Symbol::parse("bajaj-auto").unwrap().as_str(), "BAJAJ-AUTO");
    }

    #[test]
    fn test_rejects_malformed() {
        for input in ["", "   ", "1TCS", "TC$", "ABCDEFGHIJKLMNOP", "A B"] {
            assert!(
                matches!(Symbol::parse(input), Err(StockError::InvalidSymbol(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_suffix() {
        let symbol = Symbol::parse("TCS").unwrap();
        assert_eq!(symbol.with_suffix(".NS"), "TCS.NS");
        assert_eq!(symbol.with_suffix(""), "TCS");
    }

    #[test]
    fn test_serde_validates() {
        let symbol: Symbol = serde_json::from_str("\"infy\"").unwrap();
        assert_eq!(symbol.as_str(), "INFY");
        assert!(serde_json::from_str::<Symbol>("\"9X\"").is_err());
    }
}
