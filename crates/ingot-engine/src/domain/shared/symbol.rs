//! Instrument symbol value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::DomainError;

/// Maximum symbol length accepted by the engine.
const MAX_SYMBOL_LENGTH: usize = 12;

/// A tradeable instrument symbol (e.g., "XAUUSD", "EURUSD").
///
/// Symbols are normalized to uppercase on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol, normalizing to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().to_uppercase())
    }

    /// The symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Validate the symbol format.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidValue`] if the symbol is empty, too
    /// long, or contains characters outside ASCII alphanumerics.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::InvalidValue {
                field: "symbol",
                message: "must not be empty".to_string(),
            });
        }
        if self.0.len() > MAX_SYMBOL_LENGTH {
            return Err(DomainError::InvalidValue {
                field: "symbol",
                message: format!("must be at most {MAX_SYMBOL_LENGTH} characters"),
            });
        }
        if !self.0.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidValue {
                field: "symbol",
                message: "must contain only ASCII alphanumeric characters".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_normalizes_to_uppercase() {
        let symbol = Symbol::new("xauusd");
        assert_eq!(symbol.as_str(), "XAUUSD");
    }

    #[test]
    fn symbol_display() {
        let symbol = Symbol::new("EURUSD");
        assert_eq!(format!("{symbol}"), "EURUSD");
    }

    #[test]
    fn valid_symbol_passes_validation() {
        assert!(Symbol::new("XAUUSD").validate().is_ok());
        assert!(Symbol::new("US30").validate().is_ok());
    }

    #[test]
    fn empty_symbol_fails_validation() {
        let Err(err) = Symbol::new("").validate() else {
            panic!("expected validation error");
        };
        assert!(format!("{err}").contains("empty"));
    }

    #[test]
    fn over_long_symbol_fails_validation() {
        let symbol = Symbol::new("ABCDEFGHIJKLM");
        assert!(symbol.validate().is_err());
    }

    #[test]
    fn non_alphanumeric_symbol_fails_validation() {
        assert!(Symbol::new("XAU/USD").validate().is_err());
        assert!(Symbol::new("XAU USD").validate().is_err());
    }

    #[test]
    fn symbol_from_str_normalizes() {
        let symbol: Symbol = "gbpjpy".into();
        assert_eq!(symbol.as_str(), "GBPJPY");
        assert_eq!(symbol.into_inner(), "GBPJPY");
    }

    #[test]
    fn serde_roundtrip() {
        let symbol = Symbol::new("XAUUSD");
        let json = serde_json::to_string(&symbol).unwrap();
        assert_eq!(json, "\"XAUUSD\"");

        let parsed: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, symbol);
    }
}
