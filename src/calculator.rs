//! Cross rates between arbitrary currency codes, derived through the
//! reference currency.
use crate::core::cache::TtlCache;
use crate::core::error::{ConversionError, UpstreamError};
use crate::core::rates::{RateEntry, RateSource, RateTable};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub const RATES_CACHE_KEY: &str = "exchange_rate_data";

pub type RatesCache = TtlCache<String, Arc<RateTable>>;

pub struct RateCalculator {
    source: Arc<dyn RateSource>,
    cache: Arc<RatesCache>,
    ttl: Duration,
    reference_code: String,
    strict: bool,
}

impl RateCalculator {
    pub fn new(
        source: Arc<dyn RateSource>,
        cache: Arc<RatesCache>,
        ttl: Duration,
        reference_code: &str,
    ) -> Self {
        RateCalculator {
            source,
            cache,
            ttl,
            reference_code: normalize(reference_code),
            strict: false,
        }
    }

    /// In strict mode codes missing from the rate table are rejected rather
    /// than treated as the reference currency.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Current rate table, from cache if still fresh.
    pub async fn rates(&self) -> Result<Arc<RateTable>, UpstreamError> {
        self.cache
            .get_or_fetch(&RATES_CACHE_KEY.to_string(), self.ttl, || async move {
                self.source.fetch().await.map(Arc::new)
            })
            .await
    }

    /// How many units of `to` one unit of `from` buys.
    pub async fn cross_rate(&self, from: &str, to: &str) -> Result<f64, ConversionError> {
        let result = match self.rates().await {
            Ok(table) => self.cross_rate_in(&table, from, to),
            Err(e) => Err(e.into()),
        };

        match &result {
            Ok(rate) => info!(
                "Successfully calculated exchange rate from {} to {}: {}",
                from, to, rate
            ),
            Err(e) => error!(
                "Error calculating exchange rate from {} to {}: {}",
                from, to, e
            ),
        }
        result
    }

    /// Computes the cross rate against a given table without touching the cache.
    pub fn cross_rate_in(
        &self,
        table: &RateTable,
        from: &str,
        to: &str,
    ) -> Result<f64, ConversionError> {
        let (from, to) = (normalize(from), normalize(to));
        let from_entry = self.entry_for(table, &from)?;
        let to_entry = self.entry_for(table, &to)?;

        let rate = from_entry.unit_price() / to_entry.unit_price();
        if !rate.is_finite() {
            return Err(degenerate(&to, &to_entry));
        }
        Ok(rate)
    }

    fn entry_for(&self, table: &RateTable, code: &str) -> Result<RateEntry, ConversionError> {
        let entry = match table.get(code) {
            Some(entry) => *entry,
            None if !self.strict || code == self.reference_code => RateEntry::PAR,
            None => return Err(ConversionError::UnknownCurrency(code.to_string())),
        };

        if entry.nominal == 0 || entry.value == 0.0 || !entry.value.is_finite() {
            return Err(degenerate(code, &entry));
        }
        Ok(entry)
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

fn degenerate(code: &str, entry: &RateEntry) -> ConversionError {
    ConversionError::Arithmetic {
        code: code.to_string(),
        value: entry.value,
        nominal: entry.nominal,
    }
}
