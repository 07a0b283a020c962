use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A value together with the moment it was stored and how long it stays valid.
#[derive(Debug, Clone)]
pub struct CachedValue<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CachedValue<V> {
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
            ttl,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }

    /// Valid while `now - stored_at < ttl`.
    pub fn is_fresh(&self) -> bool {
        self.age() < self.ttl
    }
}

type Slot<V> = Arc<Mutex<Option<CachedValue<V>>>>;

/// In-memory cache with one slot per key and a time-to-live per entry.
///
/// Each slot has its own lock which is held while a missing or expired value
/// is being fetched, so concurrent misses on the same key wait for a single
/// fetch instead of each calling upstream. Keys never block each other.
pub struct TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    slots: Mutex<HashMap<K, Slot<V>>>,
    stale_on_error: bool,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            stale_on_error: false,
        }
    }

    /// When enabled, a failed refresh returns the expired value if one exists
    /// instead of the error.
    pub fn with_stale_on_error(mut self, enabled: bool) -> Self {
        self.stale_on_error = enabled;
        self
    }

    async fn slot(&self, key: &K) -> Slot<V> {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Returns the value for `key` if present and not expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let slot = self.slot(key).await;
        let entry = slot.lock().await;
        match entry.as_ref() {
            Some(cached) if cached.is_fresh() => {
                debug!("Cache HIT for key: {:?}", key);
                Some(cached.value().clone())
            }
            Some(_) => {
                debug!("Cache entry expired for key: {:?}", key);
                None
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    pub async fn put(&self, key: K, value: V, ttl: Duration) {
        let slot = self.slot(&key).await;
        let mut entry = slot.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        *entry = Some(CachedValue::new(value, ttl));
    }

    /// Returns the cached value for `key`, calling `fetch` only when the slot is
    /// empty or expired. A successful fetch replaces the slot; a failed one
    /// leaves it untouched and returns the error.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &K, ttl: Duration, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Display,
    {
        let slot = self.slot(key).await;
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref().filter(|cached| cached.is_fresh()) {
            debug!("Cache HIT for key: {:?}", key);
            return Ok(cached.value().clone());
        }
        debug!("Cache MISS for key: {:?}", key);

        match fetch().await {
            Ok(value) => {
                debug!("Cache PUT for key: {:?}", key);
                *entry = Some(CachedValue::new(value.clone(), ttl));
                Ok(value)
            }
            Err(err) => match entry.as_ref() {
                Some(stale) if self.stale_on_error => {
                    warn!(
                        error = %err,
                        age = ?stale.age(),
                        "Refresh failed for key: {:?}, serving stale value", key
                    );
                    Ok(stale.value().clone())
                }
                _ => Err(err),
            },
        }
    }

    pub async fn invalidate(&self, key: &K) {
        let slot = self.slot(key).await;
        let mut entry = slot.lock().await;
        *entry = None;
        debug!("Cache REMOVE for key: {:?}", key);
    }

    pub async fn clear(&self) {
        let slots: Vec<Slot<V>> = self.slots.lock().await.values().cloned().collect();
        for slot in slots {
            *slot.lock().await = None;
        }
        debug!("Cache CLEAR");
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
