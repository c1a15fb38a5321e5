//! JWT token issuance and validation
//!
//! Tokens are HS256 JWTs with a fixed claim set. Keys are derived once at
//! startup and shared through `Arc`.

use super::error::AuthError;
use super::identity::Identity;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Default token lifetime: one week
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp). Absent on tokens minted by the previous deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Pre-computed signing keys
#[derive(Clone)]
pub struct SigningKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl SigningKeys {
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: Arc::new(EncodingKey::from_secret(bytes)),
            decoding: Arc::new(DecodingKey::from_secret(bytes)),
        }
    }
}

/// Issues and validates bearer tokens.
///
/// The signing key is fixed at construction and never changes for the
/// lifetime of the value; rotating it means building a new authority (in
/// practice, restarting the process). Cloning is cheap.
#[derive(Clone)]
pub struct TokenAuthority {
    keys: SigningKeys,
    validation: Arc<Validation>,
    default_ttl: Duration,
}

impl TokenAuthority {
    /// Create a token authority with pre-computed keys
    ///
    /// Call once at startup and store in `AppState`.
    pub fn new(secret: &SecretString, default_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `validate_at` against the caller's clock, strictly.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            keys: SigningKeys::new(secret),
            validation: Arc::new(validation),
            default_ttl,
        }
    }

    /// Issue a token for `subject` with the configured lifetime
    #[inline]
    pub fn issue(&self, subject: &Identity) -> Result<String> {
        self.issue_with_ttl(subject, self.default_ttl)
    }

    /// Issue a token with an explicit lifetime
    #[inline]
    pub fn issue_with_ttl(&self, subject: &Identity, ttl: Duration) -> Result<String> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    ///
    /// `exp` is rounded up to the next whole second, so any positive `ttl`
    /// yields a token that is valid at `now`. Blank subjects and lifetimes
    /// past the representable range are errors.
    pub fn issue_at(&self, subject: &Identity, ttl: Duration, now: DateTime<Utc>) -> Result<String> {
        if subject.as_str().trim().is_empty() {
            anyhow::bail!("Cannot issue a token for a blank subject");
        }

        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| anyhow::anyhow!("Token lifetime out of range: {}", ttl))?;

        let claims = Claims {
            sub: subject.as_str().to_string(),
            exp: ceil_timestamp(expires),
            iat: Some(now.timestamp()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
    }

    /// Validate a token and return its subject
    #[inline]
    pub fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token against the clock value `now`
    ///
    /// A token is valid only while `now` is strictly before its expiry.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let claims = decode::<Claims>(token, &self.keys.decoding, &self.validation)
            .map_err(|e| {
                debug!(reason = %e, "Rejected bearer token");
                AuthError::Invalid
            })?
            .claims;

        if claims.exp <= now.timestamp() {
            debug!(exp = claims.exp, "Rejected expired bearer token");
            return Err(AuthError::Invalid);
        }

        if claims.sub.trim().is_empty() {
            debug!("Rejected bearer token without subject");
            return Err(AuthError::Invalid);
        }

        Ok(Identity::new(claims.sub))
    }

    /// Configured token lifetime
    #[inline]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

/// Unix timestamp of `at`, rounded up to a whole second
fn ceil_timestamp(at: DateTime<Utc>) -> i64 {
    at.timestamp() + i64::from(at.timestamp_subsec_nanos() > 0)
}
