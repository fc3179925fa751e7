//! In-memory response cache with per-entry TTL

use crate::types::Payload;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Deterministic key of a cacheable request
///
/// Built only through the constructors below so that equal requests always
/// produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn market_data(page_size: u32, page: u32) -> Self {
        Self(format!("market_data_{page_size}_page_{page}"))
    }

    pub fn historical(coin_id: &str, days: u32) -> Self {
        Self(format!("historical_{coin_id}_{days}"))
    }

    pub fn details(coin_id: &str) -> Self {
        Self(format!("details_{coin_id}"))
    }

    pub fn coin_data(coin_id: &str) -> Self {
        Self(format!("coin_data_{coin_id}"))
    }

    /// `ids` must already be normalized (sorted, de-duplicated)
    pub fn watchlist(ids: &[String]) -> Self {
        Self(format!("watchlist_data_{}", ids.join(",")))
    }

    pub fn fear_greed_index() -> Self {
        Self("fear_greed_index".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Payload,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_valid(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

/// Shared key to response map
///
/// Entries are never returned once their TTL has elapsed. Dead entries are
/// dropped whenever a new response is inserted.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the payload if a valid entry exists
    pub async fn get(&self, key: &CacheKey) -> Option<Payload> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_valid(Instant::now()))
            .map(|entry| entry.payload.clone())
    }

    /// Stores a payload, replacing any previous entry for the key
    pub async fn insert(&self, key: CacheKey, payload: Payload, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_valid(now));
        tracing::debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Caching response");
        entries.insert(
            key,
            CacheEntry {
                payload,
                stored_at: now,
                ttl,
            },
        );
    }

    /// Drops every entry
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        tracing::info!(dropped, "Response cache cleared");
    }

    /// Drops expired entries and returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_valid(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
