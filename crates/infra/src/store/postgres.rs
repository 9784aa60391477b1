//! Postgres-backed store.
//!
//! Tables:
//!
//! | Table | Columns |
//! |-------|---------|
//! | `users` | `id uuid primary key`, `name text not null`, `created_at timestamptz` |
//! | `posts` | `id uuid primary key`, `user_id uuid references users(id) on delete cascade`, `text text not null`, `created_at timestamptz` |
//!
//! Ids are generated application-side (UUIDv7) so inserts can use `RETURNING`
//! without a second round-trip.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use hubs_core::{PostId, UserId};
use hubs_posts::{NewPost, Post, PostChanges};
use hubs_users::{NewUser, User, UserChanges};

use super::{PostStore, StoreError, StoreResult, UserStore};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id uuid PRIMARY KEY,
    name text NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS posts (
    id uuid PRIMARY KEY,
    user_id uuid NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    text text NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS posts_user_id_idx ON posts (user_id);
"#;

/// Postgres-backed store for users and posts.
///
/// `PgPool` is internally reference counted, so cloning the store is cheap.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and return a store over a fresh pool.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{operation}: {err}"))
        }
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
        }
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<User, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    Ok(User::restore(UserId::from_uuid(id), name))
}

fn post_from_row(row: &sqlx::postgres::PgRow) -> Result<Post, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let user_id: Uuid = row.try_get("user_id")?;
    let text: String = row.try_get("text")?;
    Ok(Post::restore(PostId::from_uuid(id), UserId::from_uuid(user_id), text))
}

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, user), err)]
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query("INSERT INTO users (id, name) VALUES ($1, $2) RETURNING id, name")
            .bind(Uuid::from(UserId::new()))
            .bind(user.name())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_user", e))?;
        user_from_row(&row).map_err(|e| map_sqlx_error("insert_user", e))
    }

    #[instrument(skip(self), err)]
    async fn get(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, name FROM users ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_users", e))?;
        rows.iter()
            .map(user_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("get_users", e))
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT id, name FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_user", e))
    }

    #[instrument(skip(self, changes), fields(user_id = %id), err)]
    async fn update(&self, id: UserId, changes: UserChanges) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE users SET name = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(changes.name())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_user", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn remove(&self, id: UserId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_user", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_user_posts(&self, id: UserId) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, text
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_user_posts", e))?;
        rows.iter()
            .map(post_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("get_user_posts", e))
    }
}

#[async_trait]
impl PostStore for PostgresStore {
    #[instrument(skip(self, post), fields(user_id = %post.user_id()), err)]
    async fn insert(&self, post: NewPost) -> StoreResult<Post> {
        let row = sqlx::query(
            "INSERT INTO posts (id, user_id, text) VALUES ($1, $2, $3) RETURNING id, user_id, text",
        )
        .bind(Uuid::from(PostId::new()))
        .bind(post.user_id().as_uuid())
        .bind(post.text())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_post", e))?;
        post_from_row(&row).map_err(|e| map_sqlx_error("insert_post", e))
    }

    #[instrument(skip(self), err)]
    async fn get(&self) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query("SELECT id, user_id, text FROM posts ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_posts", e))?;
        rows.iter()
            .map(post_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("get_posts", e))
    }

    #[instrument(skip(self), fields(post_id = %id), err)]
    async fn get_by_id(&self, id: PostId) -> StoreResult<Option<Post>> {
        let row = sqlx::query("SELECT id, user_id, text FROM posts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_post", e))?;
        row.as_ref()
            .map(post_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_post", e))
    }

    #[instrument(skip(self, changes), fields(post_id = %id), err)]
    async fn update(&self, id: PostId, changes: PostChanges) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE posts SET text = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(changes.text())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_post", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(post_id = %id), err)]
    async fn remove(&self, id: PostId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_post", e))?;
        Ok(result.rows_affected())
    }
}
