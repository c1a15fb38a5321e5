//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Longest password accepted at registration, in characters
pub const MAX_PASSWORD_LEN: usize = 128;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Registration request
///
/// Password policy beyond "non-empty and bounded" is left to clients.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "Password must be 1-128 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
}

/// Bearer token issued on successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
        }
    }
}

/// Public view of a user account (never carries the password digest)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserOut {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
