use crate::calculator::RateCalculator;
use crate::core::cache::TtlCache;
use crate::core::error::UpstreamError;
use crate::core::rates::{CurrencyDescriptor, RateTable, ReferenceCurrency};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const CURRENCIES_CACHE_KEY: &str = "available_currencies";

pub type CurrenciesCache = TtlCache<String, Arc<Vec<CurrencyDescriptor>>>;

/// The currencies a caller may choose from, including the reference currency.
///
/// Built from the calculator's cached rate table, so both see the same snapshot
/// and a cold start costs a single upstream call.
pub struct CurrencyList {
    rates: Arc<RateCalculator>,
    cache: Arc<CurrenciesCache>,
    ttl: Duration,
    reference: ReferenceCurrency,
}

impl CurrencyList {
    pub fn new(
        rates: Arc<RateCalculator>,
        cache: Arc<CurrenciesCache>,
        ttl: Duration,
        reference: ReferenceCurrency,
    ) -> Self {
        CurrencyList {
            rates,
            cache,
            ttl,
            reference,
        }
    }

    pub async fn list(&self) -> Result<Arc<Vec<CurrencyDescriptor>>, UpstreamError> {
        self.cache
            .get_or_fetch(&CURRENCIES_CACHE_KEY.to_string(), self.ttl, || async move {
                let table = self.rates.rates().await?;
                let currencies = describe(&table, &self.reference);
                info!(
                    count = currencies.len(),
                    "Successfully fetched available currencies"
                );
                Ok::<_, UpstreamError>(Arc::new(currencies))
            })
            .await
    }
}

/// Descriptors for every code in `table` plus the reference currency, sorted
/// by label. Ties on label are broken by code.
pub fn describe(table: &RateTable, reference: &ReferenceCurrency) -> Vec<CurrencyDescriptor> {
    let reference = reference.descriptor();
    let mut currencies: Vec<CurrencyDescriptor> = table
        .quotes()
        .filter(|(code, _)| *code != reference.code)
        .map(|(code, quote)| CurrencyDescriptor::new(code, quote.name.as_deref()))
        .collect();
    currencies.push(reference);
    currencies.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.code.cmp(&b.code)));
    currencies
}
