use crate::core::error::UpstreamError;
use crate::core::rates::{Quote, RateEntry, RateSource, RateTable};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Reads the Central Bank of Russia daily rates feed (`daily_json.js`).
/// All values in the feed are quoted in roubles.
pub struct CbrDailyProvider {
    url: String,
    client: reqwest::Client,
}

impl CbrDailyProvider {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .user_agent("fxconv/0.1")
            .timeout(timeout)
            .build()
            .map_err(|source| UpstreamError::Request {
                url: url.to_string(),
                source,
            })?;
        Ok(CbrDailyProvider {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Valute")]
    valute: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ValuteEntry {
    char_code: Option<String>,
    name: Option<String>,
    nominal: u32,
    value: f64,
}

fn parse_entry(key: &str, raw: serde_json::Value) -> Option<(String, Quote)> {
    let entry: ValuteEntry = match serde_json::from_value(raw) {
        Ok(entry) => entry,
        Err(e) => {
            warn!("Dropping rate entry {}: {}", key, e);
            return None;
        }
    };

    if entry.nominal == 0 {
        warn!("Dropping rate entry {}: nominal must be positive", key);
        return None;
    }
    if !entry.value.is_finite() || entry.value <= 0.0 {
        warn!(
            "Dropping rate entry {}: value {} is not a positive number",
            key, entry.value
        );
        return None;
    }

    let code = entry
        .char_code
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| key.to_string())
        .trim()
        .to_uppercase();

    Some((
        code,
        Quote {
            name: entry.name,
            rate: RateEntry::new(entry.value, entry.nominal),
        },
    ))
}

/// Parses a daily feed document. Malformed entries are dropped; a document
/// without a `Valute` object is an error.
fn parse_daily(url: &str, body: &str) -> Result<RateTable, UpstreamError> {
    let response: DailyResponse =
        serde_json::from_str(body).map_err(|e| UpstreamError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let mut entries: Vec<(String, String, Quote)> = response
        .valute
        .into_iter()
        .filter_map(|(key, raw)| parse_entry(&key, raw).map(|(code, quote)| (key, code, quote)))
        .collect();
    // Entries keyed by their own code win over aliases; the rest keep key order.
    entries.sort_by_key(|(key, code, _)| key != code);

    let mut quotes: HashMap<String, Quote> = HashMap::with_capacity(entries.len());
    for (key, code, quote) in entries {
        if quotes.contains_key(&code) {
            warn!("Dropping rate entry {}: duplicate code {}", key, code);
            continue;
        }
        quotes.insert(code, quote);
    }

    let published_at = response
        .date
        .as_deref()
        .and_then(|date| match DateTime::parse_from_rfc3339(date) {
            Ok(dt) => Some(dt),
            Err(e) => {
                debug!("Could not parse feed date '{}': {}", date, e);
                None
            }
        });

    Ok(RateTable::new(quotes).with_published_at(published_at))
}

#[async_trait]
impl RateSource for CbrDailyProvider {
    #[instrument(name = "CbrDailyFetch", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<RateTable, UpstreamError> {
        debug!("Requesting exchange rates from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| UpstreamError::Request {
                url: self.url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                url: self.url.clone(),
                status: response.status(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| UpstreamError::Request {
                url: self.url.clone(),
                source,
            })?;

        let table = parse_daily(&self.url, &text)?;
        info!(
            currencies = table.len(),
            published_at = ?table.published_at(),
            "Successfully fetched exchange rate data"
        );
        Ok(table)
    }
}
