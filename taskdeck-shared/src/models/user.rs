/// User model and database operations
///
/// Users are created once at registration and are read-only for
/// authentication purposes afterwards: the API key is generated at creation
/// and immutable, and the password hash only changes through flows outside
/// this system. The Postgres-backed [`UserDirectory`] the authenticator
/// consumes lives here as [`PgUserDirectory`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name TEXT NOT NULL,
///     username TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     api_key CHAR(32) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::authenticator::{DirectoryUser, UserDirectory};

/// User model representing one account
///
/// `password_hash` and `api_key` are secrets: neither is ever logged, and
/// the api key is echoed exactly once, in the registration response.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Unique login name
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// 32-char opaque API key, generated at registration
    pub api_key: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// The password is hashed and the api key generated before this struct is
/// built; the gateway never sees plaintext credentials.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Unique login name
    pub username: String,

    /// Argon2id password hash (not the plaintext password)
    pub password_hash: String,

    /// Generated API key
    pub api_key: String,
}

impl User {
    /// Creates a new user
    ///
    /// Fails with a unique-constraint violation when the username or api
    /// key already exists.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, username, password_hash, api_key)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, username, password_hash, api_key, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.api_key)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by their API key
    pub async fn find_by_api_key(
        pool: &PgPool,
        api_key: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, password_hash, api_key, created_at
            FROM users
            WHERE api_key = $1
            "#,
        )
        .bind(api_key)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, password_hash, api_key, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

/// Postgres-backed user directory
///
/// The single suspension point of an authentication attempt: one lookup on
/// a pooled connection, released when the query returns.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<DirectoryUser>, sqlx::Error> {
        let user = User::find_by_api_key(&self.pool, api_key).await?;
        Ok(user.map(DirectoryUser::from))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryUser>, sqlx::Error> {
        let user = User::find_by_username(&self.pool, username).await?;
        Ok(user.map(DirectoryUser::from))
    }
}

impl From<User> for DirectoryUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            password_hash: user.password_hash,
        }
    }
}
