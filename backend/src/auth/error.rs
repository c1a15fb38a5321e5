//! Authentication failure types
//!
//! Neither type carries the cause of the failure.

use thiserror::Error;

/// Token validation failure.
///
/// Bad signature, malformed payload, expiry and a missing subject all
/// collapse into `Invalid`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Could not validate credentials")]
    Invalid,
}

/// Plaintext did not match the stored digest, or the digest was unreadable
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid credentials")]
pub struct CredentialMismatch;
