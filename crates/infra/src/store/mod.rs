//! Persistence boundary for users and posts.
//!
//! The HTTP layer only ever talks to these traits; it interprets their
//! outcomes but never assumes anything about the backing engine.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use thiserror::Error;

use hubs_core::{PostId, UserId};
use hubs_posts::{NewPost, Post, PostChanges};
use hubs_users::{NewUser, User, UserChanges};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// "Not found" is never an error here: lookups return `Option` and
/// mutations return the number of affected records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached (closed pool, poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the operation.
    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user and return it with its assigned id.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;

    /// All users, oldest first.
    async fn get(&self) -> StoreResult<Vec<User>>;

    async fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Returns the number of updated records (0 or 1).
    async fn update(&self, id: UserId, changes: UserChanges) -> StoreResult<u64>;

    /// Returns the number of removed records (0 or 1). The user's posts go with it.
    async fn remove(&self, id: UserId) -> StoreResult<u64>;

    /// Posts owned by `id`, oldest first.
    async fn get_user_posts(&self, id: UserId) -> StoreResult<Vec<Post>>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, post: NewPost) -> StoreResult<Post>;

    async fn get(&self) -> StoreResult<Vec<Post>>;

    async fn get_by_id(&self, id: PostId) -> StoreResult<Option<Post>>;

    async fn update(&self, id: PostId, changes: PostChanges) -> StoreResult<u64>;

    async fn remove(&self, id: PostId) -> StoreResult<u64>;
}
