//! TTL-bounded result cache keyed by normalized phone number.
//!
//! Entries expire logically as soon as their age reaches the TTL; a
//! background sweeper physically removes them on a fixed interval,
//! independent of request traffic. No size bound: entries leave only via
//! TTL expiry or explicit clear, an accepted tradeoff at the expected key
//! cardinality.

use crate::lookup::LookupResult;
use crate::phone::PhoneNumber;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Notify, RwLock};
use tracing::info;

/// A cached lookup with its storage time. Owned exclusively by the cache;
/// `get` hands out clones, never shared references.
#[derive(Debug, Clone)]
struct CacheEntry {
    result: LookupResult,
    stored_at: Instant,
}

/// Shared TTL cache. Cloning is cheap and clones share the same map —
/// the RwLock allows concurrent reads while serializing inserts, sweeps and
/// clears.
#[derive(Clone)]
pub struct ResultCache {
    entries: Arc<RwLock<HashMap<PhoneNumber, CacheEntry>>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Get a fresh result, or `None` if the key is absent or its entry has
    /// reached the TTL — expired entries are treated as absent even before
    /// the sweeper physically removes them.
    pub async fn get(&self, key: &PhoneNumber) -> Option<LookupResult> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.get(key).and_then(|e| {
            if now.duration_since(e.stored_at) < self.ttl {
                Some(e.result.clone())
            } else {
                None
            }
        })
    }

    pub async fn put(&self, key: PhoneNumber, result: LookupResult) {
        let entry = CacheEntry {
            result,
            stored_at: Instant::now(),
        };
        let mut entries = self.entries.write().await;
        entries.insert(key, entry);
    }

    /// Remove all entries unconditionally; returns the prior count.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        count
    }

    /// Physically remove expired entries; returns how many were dropped.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| now.duration_since(e.stored_at) < self.ttl);
        before - entries.len()
    }

    /// Number of entries, including logically expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Rewrite an entry's storage time, as if it had been inserted `age` ago.
    #[cfg(test)]
    pub async fn backdate(&self, key: &PhoneNumber, age: Duration) {
        let mut entries = self.entries.write().await;
        if let Some(e) = entries.get_mut(key) {
            e.stored_at = Instant::now().checked_sub(age).unwrap_or_else(Instant::now);
        }
    }
}

/// Spawn the periodic sweeper task. Runs independently of request traffic
/// until `shutdown` is notified.
pub fn spawn_sweeper(
    cache: ResultCache,
    interval: Duration,
    shutdown: Arc<Notify>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "cache sweeper started: interval={}s ttl={}s",
            interval.as_secs(),
            cache.ttl().as_secs()
        );
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; skip it so the first sweep
        // happens one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    info!("cache sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = cache.sweep().await;
                    if removed > 0 {
                        info!("cache sweep removed {removed} expired entry(s)");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{LookupResult, LookupStatus};

    fn phone(raw: &str) -> PhoneNumber {
        PhoneNumber::normalize(raw, "+84", "0")
    }

    fn result(raw: &str, name: &str) -> LookupResult {
        LookupResult {
            phone: phone(raw),
            name: name.to_string(),
            status: LookupStatus::Exists,
            method: "title".to_string(),
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let r = result("0398981698", "Target Name");
        cache.put(phone("0398981698"), r.clone()).await;

        assert_eq!(cache.get(&phone("0398981698")).await, Some(r));
        assert_eq!(cache.get(&phone("0111111111")).await, None);
    }

    #[tokio::test]
    async fn test_logical_expiry_without_sweep() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let key = phone("0398981698");
        cache.put(key.clone(), result("0398981698", "A")).await;
        cache.backdate(&key, Duration::from_secs(61)).await;

        // Expired entry is absent for readers but still physically present.
        assert_eq!(cache.get(&key).await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let cache = ResultCache::new(Duration::from_secs(60));
        for i in 0..3 {
            let raw = format!("090000000{i}");
            let key = phone(&raw);
            cache.put(key.clone(), result(&raw, "old")).await;
            cache.backdate(&key, Duration::from_secs(120)).await;
        }
        for i in 0..2 {
            let raw = format!("091000000{i}");
            cache.put(phone(&raw), result(&raw, "fresh")).await;
        }

        assert_eq!(cache.sweep().await, 3);
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.sweep().await, 0);
    }

    #[tokio::test]
    async fn test_clear_returns_prior_count() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache
            .put(phone("0398981698"), result("0398981698", "A"))
            .await;
        cache
            .put(phone("0398981699"), result("0398981699", "B"))
            .await;

        assert_eq!(cache.clear().await, 2);
        assert_eq!(cache.len().await, 0);
        assert!(cache.is_empty().await);
        assert_eq!(cache.clear().await, 0);
    }

    #[tokio::test]
    async fn test_put_replaces_existing_entry() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let key = phone("0398981698");
        cache.put(key.clone(), result("0398981698", "Old")).await;
        cache.put(key.clone(), result("0398981698", "New")).await;

        assert_eq!(cache.get(&key).await.unwrap().name, "New");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_the_map() {
        let a = ResultCache::new(Duration::from_secs(60));
        let b = a.clone();
        a.put(phone("0398981698"), result("0398981698", "A")).await;
        assert!(b.get(&phone("0398981698")).await.is_some());
    }

    #[tokio::test]
    async fn test_sweeper_task_stops_on_shutdown() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let shutdown = Arc::new(Notify::new());
        let handle = spawn_sweeper(
            cache,
            Duration::from_millis(10),
            Arc::clone(&shutdown),
        );

        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown.notify_waiters();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
