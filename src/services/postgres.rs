use crate::models::{
    InterestMatch, MatchCacheEntry, NormalizedInterests, PairKey, RoommatePreferences, User,
};
use crate::services::cache::{CacheError, MatchCacheStore};
use crate::services::users::{StoreError, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when connecting to PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// PostgreSQL connection pool shared by the user store and the match cache
#[derive(Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    pub fn user_store(&self) -> PgUserStore {
        PgUserStore { pool: self.pool.clone() }
    }

    pub fn match_cache_store(&self) -> PgMatchCacheStore {
        PgMatchCacheStore { pool: self.pool.clone() }
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Read-only user store over the `users` table
pub struct PgUserStore {
    pool: PgPool,
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let preferences: Option<Json<RoommatePreferences>> = row.try_get("roommate_preferences")?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        school_id: row.try_get("school_id")?,
        interests: row.try_get("interests")?,
        roommate_preferences: preferences.map(|Json(p)| p),
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let query = r#"
            SELECT id, name, school_id, interests, roommate_preferences
            FROM users
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| StoreError::InvalidRecord(format!("user {}: {}", user_id, e)))
    }

    async fn list_candidates(&self, user: &User) -> Result<Vec<User>, StoreError> {
        let query = r#"
            SELECT id, name, school_id, interests, roommate_preferences
            FROM users
            WHERE school_id IS NOT DISTINCT FROM $1 AND id <> $2
            ORDER BY id
        "#;

        let rows = sqlx::query(query)
            .bind(&user.school_id)
            .bind(&user.id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Found {} candidates for {}", rows.len(), user.id);

        rows.iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))
    }
}

/// Match cache store over the `match_cache` table
pub struct PgMatchCacheStore {
    pool: PgPool,
}

fn entry_from_row(row: &PgRow) -> Result<MatchCacheEntry, sqlx::Error> {
    let low: String = row.try_get("user_low")?;
    let high: String = row.try_get("user_high")?;
    let Json(result): Json<InterestMatch> = row.try_get("result")?;
    let Json(normalized_interests): Json<NormalizedInterests> =
        row.try_get("normalized_interests")?;
    let hit_count: i64 = row.try_get("hit_count")?;

    Ok(MatchCacheEntry {
        id: row.try_get("id")?,
        pair: PairKey::new(&low, &high),
        viewer_id: row.try_get("viewer_id")?,
        result,
        normalized_interests,
        hit_count: hit_count.max(0) as u64,
        created_at: row.try_get("created_at")?,
        last_accessed_at: row.try_get("last_accessed_at")?,
    })
}

const ENTRY_COLUMNS: &str = "id, user_low, user_high, viewer_id, result, normalized_interests, \
     hit_count, created_at, last_accessed_at";

#[async_trait]
impl MatchCacheStore for PgMatchCacheStore {
    async fn fetch(&self, key: &PairKey) -> Result<Option<MatchCacheEntry>, CacheError> {
        let query = format!(
            "SELECT {} FROM match_cache WHERE user_low = $1 AND user_high = $2",
            ENTRY_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(key.low())
            .bind(key.high())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(entry_from_row).transpose()?)
    }

    /// Uses INSERT ... ON CONFLICT so concurrent writers for the same pair
    /// simply overwrite each other.
    async fn upsert(&self, entry: &MatchCacheEntry) -> Result<(), CacheError> {
        let query = r#"
            INSERT INTO match_cache
                (id, user_low, user_high, viewer_id, result, normalized_interests,
                 hit_count, created_at, last_accessed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_low, user_high)
            DO UPDATE SET
                viewer_id = EXCLUDED.viewer_id,
                result = EXCLUDED.result,
                normalized_interests = EXCLUDED.normalized_interests,
                hit_count = EXCLUDED.hit_count,
                created_at = EXCLUDED.created_at,
                last_accessed_at = EXCLUDED.last_accessed_at
        "#;

        sqlx::query(query)
            .bind(entry.id)
            .bind(entry.pair.low())
            .bind(entry.pair.high())
            .bind(&entry.viewer_id)
            .bind(Json(&entry.result))
            .bind(Json(&entry.normalized_interests))
            .bind(i64::try_from(entry.hit_count).unwrap_or(i64::MAX))
            .bind(entry.created_at)
            .bind(entry.last_accessed_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn touch(&self, key: &PairKey, at: DateTime<Utc>) -> Result<Option<u64>, CacheError> {
        let query = r#"
            UPDATE match_cache
            SET hit_count = hit_count + 1, last_accessed_at = $3
            WHERE user_low = $1 AND user_high = $2
            RETURNING hit_count
        "#;

        let hits: Option<i64> = sqlx::query_scalar(query)
            .bind(key.low())
            .bind(key.high())
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(hits.map(|h| h.max(0) as u64))
    }

    async fn entries_for_user(&self, user_id: &str) -> Result<Vec<MatchCacheEntry>, CacheError> {
        let query = format!(
            "SELECT {} FROM match_cache WHERE user_low = $1 OR user_high = $1",
            ENTRY_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(entry_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn clear(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM match_cache")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
