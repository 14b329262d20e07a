//! Conversion service holding the active rate table.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::currency::CurrencyCode;
use crate::error::{RateError, RateResult};
use crate::table::RateTable;

/// Serves conversions and currency listings from the most recently installed
/// [`RateTable`].
///
/// The service has two states: until the first [`install`] every operation
/// fails with [`RateError::NotReady`]; afterwards operations run against the
/// current snapshot. Installing swaps the whole table behind an `Arc`, so a
/// concurrent reader observes either the previous table or the new one, never
/// a mixture, and a failed refresh simply leaves the previous table in place.
///
/// [`install`]: ConversionService::install
pub struct ConversionService {
    table: RwLock<Option<Arc<RateTable>>>,
}

impl ConversionService {
    /// Create a service with no table installed yet.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(None),
        }
    }

    /// Whether a table has ever been installed.
    pub fn is_ready(&self) -> bool {
        self.table.read().is_some()
    }

    /// Handle to the currently active table, if any.
    ///
    /// The lock is held only while the `Arc` is cloned; holding the returned
    /// handle does not block a concurrent install.
    pub fn current(&self) -> Option<Arc<RateTable>> {
        self.table.read().clone()
    }

    /// All currently known currency codes, sorted.
    pub fn currencies(&self) -> RateResult<Vec<CurrencyCode>> {
        let table = self.current().ok_or(RateError::NotReady)?;
        Ok(table.currencies())
    }

    /// Convert `amount` between two currencies using the active table.
    pub fn convert(&self, from: &CurrencyCode, to: &CurrencyCode, amount: f64) -> RateResult<f64> {
        let table = self.current().ok_or(RateError::NotReady)?;
        table.convert(from, to, amount)
    }

    /// Replace the active table with a freshly built one.
    pub fn install(&self, table: RateTable) {
        let currencies = table.currency_count();
        let built_at = table.built_at();
        let previous = self.table.write().replace(Arc::new(table));
        match previous {
            Some(old) => info!(
                currencies,
                built_at = %built_at,
                replaced_age_secs = old.age().num_seconds(),
                "rate table refreshed"
            ),
            None => info!(
                currencies,
                built_at = %built_at,
                "initial rate table installed"
            ),
        }
    }
}

impl Default for ConversionService {
    fn default() -> Self {
        Self::new()
    }
}
