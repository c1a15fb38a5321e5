//! User service for registration, login and profile lookup
//!
//! Login is the only place the credential manager and the token authority
//! meet: verify the password, then issue a token for the stored identity.
//! Password hashing/verification runs on the blocking thread pool.

use crate::auth::{CredentialManager, CredentialMismatch, Identity, TokenAuthority};
use crate::error::ApiError;
use crate::repositories::{UserRecord, UserRepository};
use mimic_sphere_shared::types::{TokenResponse, UserOut};
use sqlx::PgPool;
use tracing::{info, warn};

/// User service for authentication operations
pub struct UserService;

fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) => db.is_unique_violation(),
        _ => false,
    }
}

impl UserService {
    /// Register a new user
    ///
    /// Input format is validated by the route; this enforces uniqueness.
    pub async fn register(pool: &PgPool, email: &str, password: &str) -> Result<UserOut, ApiError> {
        if UserRepository::email_exists(pool, email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::BadRequest("Email already registered".to_string()));
        }

        let hashed_password = CredentialManager::hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        let user = match UserRepository::create(pool, email, &hashed_password).await {
            Ok(user) => user,
            // Lost a race with a concurrent registration
            Err(e) if is_unique_violation(&e) => {
                return Err(ApiError::BadRequest("Email already registered".to_string()))
            }
            Err(e) => return Err(ApiError::Internal(e)),
        };

        info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(
        pool: &PgPool,
        tokens: &TokenAuthority,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        let Some(user) = UserRepository::find_by_email(pool, email)
            .await
            .map_err(ApiError::Internal)?
        else {
            CredentialManager::verify_decoy_async(password.to_string())
                .await
                .map_err(ApiError::Internal)?;
            return Err(CredentialMismatch.into());
        };

        let valid = CredentialManager::verify_async(password.to_string(), user.hashed_password.clone())
            .await
            .map_err(ApiError::Internal)?;
        if !valid {
            return Err(CredentialMismatch.into());
        }

        if CredentialManager::needs_rehash(&user.hashed_password) {
            Self::upgrade_digest(pool, &user, password).await;
        }

        let access_token = tokens
            .issue(&user.identity())
            .map_err(ApiError::Internal)?;

        Ok(TokenResponse::bearer(
            access_token,
            tokens.default_ttl().num_seconds(),
        ))
    }

    /// Get the profile of an authenticated user
    pub async fn get_profile(pool: &PgPool, identity: &Identity) -> Result<UserOut, ApiError> {
        let user = UserRepository::find_by_identity(pool, identity)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    /// Replace a legacy digest after a successful login. Best-effort.
    async fn upgrade_digest(pool: &PgPool, user: &UserRecord, password: &str) {
        let rehashed = match CredentialManager::hash_async(password.to_string()).await {
            Ok(digest) => digest,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Failed to rehash legacy password digest");
                return;
            }
        };

        match UserRepository::update_password_hash(pool, user.id, &rehashed).await {
            Ok(()) => info!(user_id = %user.id, "Upgraded legacy password digest"),
            Err(e) => warn!(user_id = %user.id, error = %e, "Failed to store upgraded password digest"),
        }
    }
}
