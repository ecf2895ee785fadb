use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;

/// Cached response body plus the TTL it was admitted with.
#[derive(Clone)]
struct CachedRead {
    body: serde_json::Value,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, CachedRead> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedRead,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Read-side memoization of expensive ledger aggregates. Current-day
/// reads expire fast; closed periods are immutable and can sit longer.
/// Writers call `invalidate_all` rather than chasing individual keys:
/// cross-entity aggregates depend on too many of them.
pub struct LedgerCache {
    inner: Cache<String, CachedRead>,
    current_ttl: Duration,
    closed_ttl: Duration,
}

impl LedgerCache {
    pub fn new(current_ttl: Duration, closed_ttl: Duration) -> Self {
        let inner = Cache::builder().max_capacity(10_000).expire_after(PerEntryTtl).build();
        Self { inner, current_ttl, closed_ttl }
    }

    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.get(key).await.map(|c| c.body)
    }

    pub async fn put(&self, key: String, body: serde_json::Value, current_period: bool) {
        let ttl = if current_period { self.current_ttl } else { self.closed_ttl };
        self.inner.insert(key, CachedRead { body, ttl }).await;
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalidate_all_clears_entries() {
        let cache = LedgerCache::new(Duration::from_secs(30), Duration::from_secs(300));
        cache.put("k".into(), serde_json::json!({"n": 1}), true).await;
        assert!(cache.get("k").await.is_some());
        cache.invalidate_all();
        cache.inner.run_pending_tasks().await;
        assert!(cache.get("k").await.is_none());
    }
}
