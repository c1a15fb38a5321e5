//! Authentication routes
//!
//! Provides endpoints for user registration, login, and the current user.
//!
//! Password hashing runs on the blocking thread pool, so these handlers
//! never stall the async runtime.

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use mimic_sphere_shared::types::{LoginRequest, RegisterRequest, TokenResponse, UserOut};
use validator::Validate;

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(get_profile))
}

/// Register a new user
///
/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<UserOut>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let user = UserService::register(&state.db, &req.email, &req.password).await?;
    Ok(Json(user))
}

/// Login with email and password
///
/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let token = UserService::login(&state.db, state.tokens(), &req.email, &req.password).await?;
    Ok(Json(token))
}

/// Get current user profile (requires authentication)
///
/// GET /auth/me
async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserOut>> {
    let profile = UserService::get_profile(&state.db, &auth_user.identity).await?;
    Ok(Json(profile))
}
