//! Core abstractions shared by providers and the conversion layer

pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use cache::{CachedValue, TtlCache};
pub use error::{ConversionError, ErrorKind, UpstreamError};
pub use rates::{CurrencyDescriptor, Quote, RateEntry, RateSource, RateTable, ReferenceCurrency};
