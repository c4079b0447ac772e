use crate::models::{InterestMatch, MatchCacheEntry, NormalizedInterests, PairKey};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Postgres error: {0}")]
    PostgresError(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Persistence backend for memoized interest matches
///
/// Implementations only ever see canonical [`PairKey`]s. Writes for the same
/// key overwrite each other (last writer wins).
#[async_trait]
pub trait MatchCacheStore: Send + Sync {
    async fn fetch(&self, key: &PairKey) -> Result<Option<MatchCacheEntry>, CacheError>;

    async fn upsert(&self, entry: &MatchCacheEntry) -> Result<(), CacheError>;

    /// Bump the hit counter and last-access time, returning the new count
    async fn touch(&self, key: &PairKey, at: DateTime<Utc>) -> Result<Option<u64>, CacheError>;

    /// Every entry that involves `user_id`
    async fn entries_for_user(&self, user_id: &str) -> Result<Vec<MatchCacheEntry>, CacheError>;

    /// Remove all entries, returning how many were deleted
    async fn clear(&self) -> Result<u64, CacheError>;
}

/// Interest match cache keyed by user pair
///
/// All public methods take the two user ids in any order; the key is
/// canonicalized here so `(a, b)` and `(b, a)` always hit the same record.
/// Entries never expire.
#[derive(Clone)]
pub struct MatchCache {
    store: Arc<dyn MatchCacheStore>,
}

impl MatchCache {
    pub fn new(store: Arc<dyn MatchCacheStore>) -> Self {
        Self { store }
    }

    /// Cache backed by process memory, for tests and local runs
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryMatchCacheStore::default()))
    }

    /// Look up the cached match for a pair
    pub async fn get(&self, a: &str, b: &str) -> Result<Option<MatchCacheEntry>, CacheError> {
        let key = PairKey::new(a, b);
        let entry = self.store.fetch(&key).await?;

        match &entry {
            Some(_) => tracing::debug!("Match cache hit: {}", key),
            None => tracing::debug!("Match cache miss: {}", key),
        }

        Ok(entry)
    }

    /// Store a freshly computed match for a pair
    pub async fn put(
        &self,
        a: &str,
        b: &str,
        result: InterestMatch,
    ) -> Result<MatchCacheEntry, CacheError> {
        self.put_with_interests(a, b, result, NormalizedInterests::default()).await
    }

    /// Store a match together with the normalized interests it was computed from
    ///
    /// `a` is the viewer `result` was scored for. `normalized` is given as
    /// (a's interests, b's interests) and is reordered to follow the canonical key.
    pub async fn put_with_interests(
        &self,
        a: &str,
        b: &str,
        result: InterestMatch,
        normalized: NormalizedInterests,
    ) -> Result<MatchCacheEntry, CacheError> {
        let key = PairKey::new(a, b);
        let normalized = if key.low() == a {
            normalized
        } else {
            NormalizedInterests {
                low: normalized.high,
                high: normalized.low,
            }
        };

        let entry = MatchCacheEntry::new(key, a, result, normalized);
        self.store.upsert(&entry).await?;

        tracing::debug!("Match cache set: {} (score {})", entry.pair, entry.result.score);
        Ok(entry)
    }

    /// Record a read of `entry`: bump its hit count and access time
    ///
    /// The cached score is left untouched.
    pub async fn record_hit(&self, entry: &mut MatchCacheEntry) -> Result<(), CacheError> {
        let now = Utc::now();
        let hits = self.store.touch(&entry.pair, now).await?;

        entry.hit_count = hits.unwrap_or(entry.hit_count + 1);
        entry.last_accessed_at = now;
        Ok(())
    }

    /// Cached interest scores between `user_id` and everyone they were matched with
    pub async fn scores_for_user(&self, user_id: &str) -> Result<HashMap<String, f64>, CacheError> {
        let entries = self.store.entries_for_user(user_id).await?;

        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                entry
                    .pair
                    .other(user_id)
                    .map(|other| (other.to_string(), entry.result.score))
            })
            .collect())
    }

    /// Drop every cached match
    pub async fn clear(&self) -> Result<u64, CacheError> {
        let cleared = self.store.clear().await?;
        tracing::info!("Cleared {} cached matches", cleared);
        Ok(cleared)
    }
}

/// Match cache store held in process memory
#[derive(Default)]
pub struct InMemoryMatchCacheStore {
    entries: RwLock<HashMap<PairKey, MatchCacheEntry>>,
}

#[async_trait]
impl MatchCacheStore for InMemoryMatchCacheStore {
    async fn fetch(&self, key: &PairKey) -> Result<Option<MatchCacheEntry>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn upsert(&self, entry: &MatchCacheEntry) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(entry.pair.clone(), entry.clone());
        Ok(())
    }

    async fn touch(&self, key: &PairKey, at: DateTime<Utc>) -> Result<Option<u64>, CacheError> {
        let mut entries = self.entries.write().await;
        Ok(entries.get_mut(key).map(|entry| {
            entry.hit_count += 1;
            entry.last_accessed_at = at;
            entry.hit_count
        }))
    }

    async fn entries_for_user(&self, user_id: &str) -> Result<Vec<MatchCacheEntry>, CacheError> {
        Ok(self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| entry.pair.contains(user_id))
            .cloned()
            .collect())
    }

    async fn clear(&self) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let count = entries.len() as u64;
        entries.clear();
        Ok(count)
    }
}
