//! Error taxonomy for rate fetching and conversion

use thiserror::Error;

/// Failure talking to, or understanding, the rate provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Request error: {source} for URL: {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for URL: {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse rate response from {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// Whether a failure is the caller's fault or the service's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Client,
    Service,
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Value cannot be negative: {0}")]
    NegativeValue(f64),

    #[error("Invalid value parameter: {0:?}")]
    UnknownValueFormat(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Value too large to convert: {0}")]
    ValueTooLarge(f64),

    #[error("Degenerate rate for {code}: value {value}, nominal {nominal}")]
    Arithmetic { code: String, value: f64, nominal: u32 },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::NegativeValue(_)
            | ConversionError::UnknownValueFormat(_)
            | ConversionError::UnknownCurrency(_)
            | ConversionError::ValueTooLarge(_) => ErrorKind::Client,
            ConversionError::Arithmetic { .. } | ConversionError::Upstream(_) => ErrorKind::Service,
        }
    }
}
