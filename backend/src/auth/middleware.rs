//! Authentication extractor
//!
//! Pulls the bearer token out of the `Authorization` header and resolves it
//! to an [`Identity`] with the token authority held in `AppState`.

use super::error::AuthError;
use super::identity::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

/// Authenticated user extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: Identity,
}

/// Extract the raw token from an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::Invalid)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::Invalid)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::Invalid);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Invalid);
    }
    Ok(token)
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(&parts.headers).map_err(|e| {
            debug!(path = %parts.uri.path(), "Missing or malformed authorization header");
            e
        })?;

        let identity = app_state.tokens().validate(token)?;

        Ok(AuthUser { identity })
    }
}
