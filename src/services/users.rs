use crate::models::User;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when reading users
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Postgres error: {0}")]
    PostgresError(#[from] sqlx::Error),

    #[error("Invalid user record: {0}")]
    InvalidRecord(String),
}

/// Read-only access to user records
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// Users who could be recommended to `user`: same school, never the user
    /// themself
    async fn list_candidates(&self, user: &User) -> Result<Vec<User>, StoreError>;
}

/// User store held in process memory, for tests and local runs
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn list_candidates(&self, user: &User) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        let mut candidates: Vec<User> = users
            .values()
            .filter(|candidate| candidate.id != user.id && candidate.school_id == user.school_id)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(candidates)
    }
}
