/*
 * Responsibility
 * - users の永続化インターフェース (UserStore)
 * - Postgres 実装 (SQLx)
 *
 * Table
 *   users(id UUID PK, username TEXT UNIQUE, password TEXT, nickname TEXT, role TEXT)
 */
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "ROLE_USER",
            UserRole::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(UserRole::User),
            "ROLE_ADMIN" => Ok(UserRole::Admin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub role: UserRole,
}

/// Storage for user accounts. Usernames are unique; `save` reports a duplicate as
/// [`RepoError::Conflict`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists_by_username(&self, username: &str) -> Result<bool, RepoError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    async fn save(&self, user: NewUser) -> Result<User, RepoError>;
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password: String,
    nickname: String,
    role: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let role = row.role.parse().unwrap_or_else(|_| {
            tracing::warn!(username = %row.username, role = %row.role, "unknown role in users table");
            UserRole::User
        });
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password,
            nickname: row.nickname,
            role,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str) -> Result<Self, RepoError> {
        let db = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(db))
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn exists_by_username(&self, username: &str) -> Result<bool, RepoError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)
            "#,
        )
        .bind(username)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password, nickname, role
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(User::from))
    }

    async fn save(&self, user: NewUser) -> Result<User, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, password, nickname, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password, nickname, role
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.nickname)
        .bind(user.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row.into())
    }
}
