//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: signing keys and DB pools are created once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling

use crate::auth::TokenAuthority;
use crate::config::AppConfig;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// - `db`: PgPool is internally Arc'd, cloning is O(1)
/// - `config`: Wrapped in Arc, cloning is O(1)
/// - `tokens`: Pre-computed keys wrapped in Arc, cloning is O(1)
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token authority holding the process-wide signing key
    pub tokens: TokenAuthority,
}

impl AppState {
    /// Create a new application state
    ///
    /// The token authority is built by the caller from the resolved
    /// signing key, so configuration errors surface before this point.
    pub fn new(db: PgPool, config: AppConfig, tokens: TokenAuthority) -> Self {
        Self {
            db,
            config: Arc::new(config),
            tokens,
        }
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the token authority
    #[inline]
    pub fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }
}
