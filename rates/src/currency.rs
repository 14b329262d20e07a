//! Currency code identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a currency, e.g. `"USD"` or `"BTC"`.
///
/// Codes are opaque to this crate: comparison is exact string equality and no
/// case normalization is applied. Callers pass codes exactly as the quote
/// provider lists them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a new currency code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_is_case_sensitive() {
        assert_ne!(CurrencyCode::new("usd"), CurrencyCode::new("USD"));
        assert_eq!(CurrencyCode::new("USD"), CurrencyCode::from("USD"));
    }

    #[test]
    fn test_display() {
        assert_eq!(CurrencyCode::new("BRL").to_string(), "BRL");
    }

    #[test]
    fn test_serializes_as_bare_string() {
        let json = serde_json::to_string(&CurrencyCode::new("GBP")).unwrap();
        assert_eq!(json, "\"GBP\"");
        let code: CurrencyCode = serde_json::from_str("\"EUR\"").unwrap();
        assert_eq!(code, CurrencyCode::new("EUR"));
    }
}
