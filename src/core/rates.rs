//! Exchange rate data types and the rate source abstraction

use crate::core::error::UpstreamError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Price of `nominal` units of a currency, expressed in the reference currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub value: f64,
    pub nominal: u32,
}

impl RateEntry {
    /// Rate used for codes absent from the table.
    pub const PAR: RateEntry = RateEntry {
        value: 1.0,
        nominal: 1,
    };

    pub fn new(value: f64, nominal: u32) -> Self {
        Self { value, nominal }
    }

    /// Price of a single unit in the reference currency.
    pub fn unit_price(&self) -> f64 {
        self.value / f64::from(self.nominal)
    }
}

/// A currency as published by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub name: Option<String>,
    pub rate: RateEntry,
}

/// Snapshot of one provider fetch, keyed by upper-case currency code.
///
/// The reference currency is never a key; lookups for it fall back to par.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    quotes: HashMap<String, Quote>,
    published_at: Option<DateTime<FixedOffset>>,
}

impl RateTable {
    pub fn new(quotes: HashMap<String, Quote>) -> Self {
        Self {
            quotes,
            published_at: None,
        }
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<FixedOffset>>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Builds a table from `(code, value, nominal)` triples without names.
    pub fn from_rates<'a>(rates: impl IntoIterator<Item = (&'a str, f64, u32)>) -> Self {
        let quotes = rates
            .into_iter()
            .map(|(code, value, nominal)| {
                (
                    code.to_uppercase(),
                    Quote {
                        name: None,
                        rate: RateEntry::new(value, nominal),
                    },
                )
            })
            .collect();
        Self::new(quotes)
    }

    pub fn get(&self, code: &str) -> Option<&RateEntry> {
        self.quotes.get(code).map(|q| &q.rate)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.quotes.contains_key(code)
    }

    pub fn quotes(&self) -> impl Iterator<Item = (&str, &Quote)> {
        self.quotes.iter().map(|(code, quote)| (code.as_str(), quote))
    }

    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.published_at
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// The implicit base currency of the provider's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCurrency {
    pub code: String,
    pub name: String,
}

impl Default for ReferenceCurrency {
    fn default() -> Self {
        Self {
            code: "RUB".to_string(),
            name: "Российский рубль".to_string(),
        }
    }
}

impl ReferenceCurrency {
    /// Descriptor with the code trimmed and upper-cased, as table keys are.
    pub fn descriptor(&self) -> CurrencyDescriptor {
        CurrencyDescriptor::new(&self.code.trim().to_uppercase(), Some(&self.name))
    }
}

/// A currency code paired with its display label, e.g. `("USD", "USD - Доллар США")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyDescriptor {
    pub code: String,
    pub label: String,
}

impl CurrencyDescriptor {
    pub fn new(code: &str, name: Option<&str>) -> Self {
        let label = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => format!("{code} - {name}"),
            None => code.to_string(),
        };
        Self {
            code: code.to_string(),
            label,
        }
    }
}

/// Retrieves a fresh [`RateTable`] from an upstream provider. Implementations
/// do not cache or retry.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<RateTable, UpstreamError>;
}
