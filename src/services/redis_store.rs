use crate::models::{MatchCacheEntry, PairKey};
use crate::services::cache::{CacheError, MatchCacheStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use std::sync::Arc;

/// Prefix shared by every key this store writes
const KEY_PREFIX: &str = "match_cache";

/// Match cache store on Redis
///
/// Each pair is one JSON value written without expiry. A set per user lists
/// the pair keys that user appears in.
pub struct RedisMatchCacheStore {
    // Store ConnectionManager in a Mutex for interior mutability
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
}

impl RedisMatchCacheStore {
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
        })
    }
}

/// Redis key builder
pub struct RedisKey;

impl RedisKey {
    /// Key holding the cached entry for a pair
    pub fn pair(key: &PairKey) -> String {
        // JSON keeps ids containing separators unambiguous
        let ids = serde_json::json!([key.low(), key.high()]);
        format!("{}:pair:{}", KEY_PREFIX, ids)
    }

    /// Key of the set indexing a user's pairs
    pub fn user(user_id: &str) -> String {
        format!("{}:user:{}", KEY_PREFIX, user_id)
    }

    pub fn pattern() -> String {
        format!("{}:*", KEY_PREFIX)
    }
}

#[async_trait]
impl MatchCacheStore for RedisMatchCacheStore {
    async fn fetch(&self, key: &PairKey) -> Result<Option<MatchCacheEntry>, CacheError> {
        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(RedisKey::pair(key))
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        value
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    async fn upsert(&self, entry: &MatchCacheEntry) -> Result<(), CacheError> {
        let json = serde_json::to_string(entry)?;
        let pair_key = RedisKey::pair(&entry.pair);

        let mut conn = self.redis.lock().await;
        let _: () = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&pair_key)
            .arg(json)
            .ignore()
            .cmd("SADD")
            .arg(RedisKey::user(entry.pair.low()))
            .arg(&pair_key)
            .ignore()
            .cmd("SADD")
            .arg(RedisKey::user(entry.pair.high()))
            .arg(&pair_key)
            .ignore()
            .query_async(&mut *conn)
            .await?;

        Ok(())
    }

    async fn touch(&self, key: &PairKey, at: DateTime<Utc>) -> Result<Option<u64>, CacheError> {
        let Some(mut entry) = self.fetch(key).await? else {
            return Ok(None);
        };

        entry.hit_count += 1;
        entry.last_accessed_at = at;

        // Read-modify-write: a concurrent touch may be lost, the score never is
        let json = serde_json::to_string(&entry)?;
        let mut conn = self.redis.lock().await;
        let _: () = redis::cmd("SET")
            .arg(RedisKey::pair(key))
            .arg(json)
            .query_async(&mut *conn)
            .await?;

        Ok(Some(entry.hit_count))
    }

    async fn entries_for_user(&self, user_id: &str) -> Result<Vec<MatchCacheEntry>, CacheError> {
        let mut conn = self.redis.lock().await;
        let keys: Vec<String> = redis::cmd("SMEMBERS")
            .arg(RedisKey::user(user_id))
            .query_async(&mut *conn)
            .await?;

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        values
            .into_iter()
            .flatten()
            .map(|json| serde_json::from_str(&json).map_err(CacheError::from))
            .collect()
    }

    async fn clear(&self) -> Result<u64, CacheError> {
        let mut conn = self.redis.lock().await;
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(RedisKey::pattern())
            .query_async(&mut *conn)
            .await?;

        let pair_prefix = format!("{}:pair:", KEY_PREFIX);
        let cleared = keys.iter().filter(|k| k.starts_with(&pair_prefix)).count() as u64;

        if !keys.is_empty() {
            let _: () = redis::cmd("DEL")
                .arg(keys)
                .query_async(&mut *conn)
                .await?;
        }

        Ok(cleared)
    }
}
