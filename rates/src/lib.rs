//! Cambio Rate Engine
//!
//! Exchange-rate snapshot engine for the cambio conversion service.
//!
//! # Features
//!
//! - Immutable rate tables expressed against a single reference currency
//! - Concurrent quote fetching with per-currency failure tolerance
//! - Atomic table swaps, so readers never see a half-refreshed state
//! - Cancellable background refresh loop
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use cambio_rates::{ConversionService, CurrencyCode, RateTableBuilder, Refresher};
//!
//! let service = Arc::new(ConversionService::new());
//! let builder = RateTableBuilder::new(CurrencyCode::new("USD"), provider);
//! let handle = Refresher::new(builder, service.clone(), Duration::from_secs(300)).spawn();
//!
//! // Serves NotReady until the first refresh cycle lands, then:
//! let brl = service.convert(&CurrencyCode::new("USD"), &CurrencyCode::new("BRL"), 25.0)?;
//!
//! handle.shutdown().await;
//! ```

pub mod builder;
pub mod currency;
pub mod error;
pub mod provider;
pub mod refresher;
pub mod service;
pub mod table;

pub use builder::RateTableBuilder;
pub use currency::CurrencyCode;
pub use error::{ConversionSide, RateError, RateResult};
pub use provider::QuoteProvider;
pub use refresher::{Refresher, RefresherHandle};
pub use service::ConversionService;
pub use table::RateTable;
