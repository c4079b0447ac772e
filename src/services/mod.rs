// Service exports
pub mod cache;
pub mod compatibility;
pub mod postgres;
pub mod redis_store;
pub mod scorer;
pub mod users;

pub use cache::{CacheError, InMemoryMatchCacheStore, MatchCache, MatchCacheStore};
pub use compatibility::{CompatibilityService, ServiceError};
pub use postgres::{PgMatchCacheStore, PgUserStore, PostgresClient, PostgresError};
pub use redis_store::{RedisKey, RedisMatchCacheStore};
pub use scorer::{
    score_pair, HeuristicInterestScorer, InterestScorer, MemoizedScorer, RemoteInterestScorer,
    ScorerError,
};
pub use users::{InMemoryUserStore, StoreError, UserStore};

use crate::config::{CacheBackend, CacheSettings};
use std::sync::Arc;

/// Open the match cache on the configured backend
///
/// `postgres` is only consulted for the Postgres backend.
pub async fn open_match_cache(
    settings: &CacheSettings,
    postgres: Option<&PostgresClient>,
) -> Result<MatchCache, CacheError> {
    match settings.backend {
        CacheBackend::Postgres => {
            let postgres = postgres.ok_or_else(|| {
                CacheError::Unavailable(
                    "the postgres backend needs a database connection".to_string(),
                )
            })?;
            Ok(MatchCache::new(Arc::new(postgres.match_cache_store())))
        }
        CacheBackend::Redis => {
            let url = settings.redis_url.as_deref().ok_or_else(|| {
                CacheError::Unavailable(
                    "cache.redis_url is required for the redis backend".to_string(),
                )
            })?;
            let store = RedisMatchCacheStore::new(url).await?;
            Ok(MatchCache::new(Arc::new(store)))
        }
        CacheBackend::Memory => {
            tracing::warn!("Match cache is held in process memory and will not survive a restart");
            Ok(MatchCache::in_memory())
        }
    }
}
