//! User repository for database operations

use crate::auth::Identity;
use anyhow::Result;
use chrono::{DateTime, Utc};
use mimic_sphere_shared::types::UserOut;
use sqlx::PgPool;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn identity(&self) -> Identity {
        Identity::from(self.id)
    }
}

impl From<UserRecord> for UserOut {
    fn from(user: UserRecord) -> Self {
        UserOut {
            id: user.id.to_string(),
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(pool: &PgPool, email: &str, hashed_password: &str) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (email, hashed_password)
            VALUES ($1, $2)
            RETURNING id, email, hashed_password, created_at
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, hashed_password, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by identity
    ///
    /// Identities that are not user ids match nothing.
    pub async fn find_by_identity(pool: &PgPool, identity: &Identity) -> Result<Option<UserRecord>> {
        let Some(id) = identity.as_uuid() else {
            return Ok(None);
        };

        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, hashed_password, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Check if email exists
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Replace a user's password digest
    pub async fn update_password_hash(pool: &PgPool, id: Uuid, hashed_password: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET hashed_password = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(hashed_password)
        .execute(pool)
        .await?;

        Ok(())
    }
}
