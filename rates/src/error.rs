//! Rate engine error types.

use std::fmt;

use thiserror::Error;

use crate::currency::CurrencyCode;

/// Which side of a conversion a currency code appeared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionSide {
    /// The currency being converted from.
    From,
    /// The currency being converted to.
    To,
}

impl fmt::Display for ConversionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionSide::From => write!(f, "from"),
            ConversionSide::To => write!(f, "to"),
        }
    }
}

/// Errors that can occur in the rate engine.
#[derive(Debug, Error)]
pub enum RateError {
    /// Reference currency missing from the rate mapping at construction.
    #[error("reference currency {0} must be present in the rate mapping")]
    InvalidReference(CurrencyCode),

    /// Reference currency carries a rate other than exactly 1.0.
    #[error("reference currency {code} must have rate 1.0, got {value}")]
    InvalidReferenceValue { code: CurrencyCode, value: f64 },

    /// A rate is zero, negative, or not finite.
    #[error("rate for {code} must be a positive finite number, got {value}")]
    InvalidRate { code: CurrencyCode, value: f64 },

    /// Conversion requested for a currency the active table does not list.
    #[error("unknown \"{side}\" currency: {code}")]
    UnknownCurrency {
        side: ConversionSide,
        code: CurrencyCode,
    },

    /// No rate table has been installed yet.
    #[error("currency data not available yet")]
    NotReady,

    /// The configured reference currency is not in the provider's listing.
    #[error("reference currency {0} is not listed by the quote provider")]
    ReferenceNotListed(CurrencyCode),

    /// Transport or protocol failure talking to the quote provider.
    #[error("quote provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Result type for rate engine operations.
pub type RateResult<T> = Result<T, RateError>;
