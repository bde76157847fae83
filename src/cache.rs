use std::hash::Hash;
use std::time::Duration;

use moka::sync::Cache;

/// Bounded response cache with a fixed time-to-live.
///
/// Owned by whoever issues the requests and passed around by reference; entries expire on
/// their own and can be dropped explicitly with [`ResponseCache::invalidate_all`].
#[derive(Clone)]
pub struct ResponseCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, V>,
}

impl<K, V> ResponseCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(capacity).time_to_live(ttl).build(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Return the cached value for `key`, or run `fetch` and cache what it returns.
    /// Failed fetches are not cached.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.inner.get(&key) {
            return Ok(hit);
        }
        let value = fetch()?;
        self.inner.insert(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) {
        self.inner.invalidate(key);
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
