//! Authentication module
//!
//! Provides JWT bearer tokens and argon2 password hashing. The credential
//! manager and token authority are independent; login composes them.

mod error;
mod identity;
mod jwt;
mod middleware;
mod password;

pub use error::{AuthError, CredentialMismatch};
pub use identity::Identity;
pub use jwt::{Claims, TokenAuthority, DEFAULT_TOKEN_TTL_SECS};
pub use middleware::{bearer_token, AuthUser};
pub use password::CredentialManager;
