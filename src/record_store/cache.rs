use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
}

/// Process-local read cache with a fixed TTL and prefix invalidation.
pub struct ReadCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> ReadCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: impl Into<String>, value: T) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.into(),
                CacheEntry {
                    value,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    pub fn invalidate_prefix(&self, prefix: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, _| !key.starts_with(prefix));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = ReadCache::new(Duration::from_secs(30));
        cache.put("students:all", 1);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get("students:all"), Some(1));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("students:all"), None);
    }

    #[tokio::test]
    async fn prefix_invalidation_spares_other_entities() {
        let cache = ReadCache::new(Duration::from_secs(30));
        cache.put("students:all", 1);
        cache.put("students:7", 2);
        cache.put("groups:all", 3);

        cache.invalidate_prefix("students:");

        assert_eq!(cache.get("students:all"), None);
        assert_eq!(cache.get("students:7"), None);
        assert_eq!(cache.get("groups:all"), Some(3));
    }
}
