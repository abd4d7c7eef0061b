use crate::models::DateRange;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

type RangeKey = (String, String);

pub struct CacheLookup<T> {
    pub value: Arc<T>,
    pub hit: bool,
}

/// Memoizes fetch results per exact `(start, end)` date pair.
///
/// Entries live for the whole process; nothing is evicted. Overlapping or
/// nested ranges are separate keys. The lock is held across the fetch, so
/// concurrent callers are serialised and each key is fetched at most once.
pub struct QueryCache<T> {
    entries: Mutex<HashMap<RangeKey, Arc<T>>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `range`, or runs `fetch` once and stores
    /// its result. Errors are returned as-is and leave the cache untouched.
    pub async fn get_or_fetch<F, Fut, E>(&self, range: DateRange, fetch: F) -> Result<CacheLookup<T>, E>
    where
        F: FnOnce(DateRange) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = range.key();
        let mut entries = self.entries.lock().await;
        if let Some(value) = entries.get(&key) {
            debug!("cache hit for {range}");
            return Ok(CacheLookup {
                value: Arc::clone(value),
                hit: true,
            });
        }

        let value = Arc::new(fetch(range).await?);
        entries.insert(key, Arc::clone(&value));
        info!("cached {range} ({} entries)", entries.len());
        Ok(CacheLookup { value, hit: false })
    }

    pub async fn invalidate(&self, range: &DateRange) -> bool {
        self.entries.lock().await.remove(&range.key()).is_some()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    #[cfg(test)]
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
