//! Entry point for the HTTP layer: amount conversion and the currency list.
use crate::calculator::{RateCalculator, RatesCache};
use crate::core::config::AppConfig;
use crate::core::error::{ConversionError, UpstreamError};
use crate::core::rates::{CurrencyDescriptor, RateSource};
use crate::currency_list::{CurrenciesCache, CurrencyList};
use crate::providers::CbrDailyProvider;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Converter {
    calculator: Arc<RateCalculator>,
    currencies: CurrencyList,
}

impl Converter {
    pub fn new(calculator: Arc<RateCalculator>, currencies: CurrencyList) -> Self {
        Converter {
            calculator,
            currencies,
        }
    }

    /// Builds a converter reading from the configured upstream URL.
    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        let provider = CbrDailyProvider::new(&config.upstream_url, config.request_timeout())?;
        Ok(Self::with_source(Arc::new(provider), config))
    }

    /// Builds a converter around any rate source, with fresh caches.
    pub fn with_source(source: Arc<dyn RateSource>, config: &AppConfig) -> Self {
        let rates_cache =
            Arc::new(RatesCache::new().with_stale_on_error(config.serve_stale_on_error));
        let currencies_cache =
            Arc::new(CurrenciesCache::new().with_stale_on_error(config.serve_stale_on_error));

        let calculator = Arc::new(
            RateCalculator::new(
                source,
                rates_cache,
                config.cache_ttl(),
                &config.reference_currency.code,
            )
            .strict(config.strict_currencies),
        );
        let currencies = CurrencyList::new(
            Arc::clone(&calculator),
            currencies_cache,
            config.cache_ttl(),
            config.reference_currency.clone(),
        );

        Self::new(calculator, currencies)
    }

    pub fn calculator(&self) -> &RateCalculator {
        &self.calculator
    }

    /// Parses a raw amount as received from a request.
    pub fn parse_value(raw: &str) -> Result<f64, ConversionError> {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => {
                warn!("Invalid value parameter: {:?}", raw);
                Err(ConversionError::UnknownValueFormat(raw.to_string()))
            }
        }
    }

    /// Converts `value` units of `from` into `to`. Invalid amounts are rejected
    /// before any rate lookup.
    pub async fn convert(&self, from: &str, to: &str, value: f64) -> Result<f64, ConversionError> {
        if !value.is_finite() {
            warn!("Attempt to convert a non-finite value: {}", value);
            return Err(ConversionError::UnknownValueFormat(value.to_string()));
        }
        if value < 0.0 {
            warn!("Attempt to convert a negative value: {}", value);
            return Err(ConversionError::NegativeValue(value));
        }

        let rate = self.calculator.cross_rate(from, to).await?;
        let result = rate * value;
        if !result.is_finite() {
            warn!(
                "Conversion overflowed: {} to {}, value: {}, rate: {}",
                from, to, value, rate
            );
            return Err(ConversionError::ValueTooLarge(value));
        }
        info!(
            "Conversion successful: {} to {}, value: {}, result: {}",
            from, to, value, result
        );
        Ok(result)
    }

    pub async fn list_currencies(&self) -> Result<Arc<Vec<CurrencyDescriptor>>, ConversionError> {
        Ok(self.currencies.list().await?)
    }
}
