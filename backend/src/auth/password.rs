//! Password hashing using argon2
//!
//! New digests are Argon2id PHC strings. Digests written by the previous
//! deployment are bcrypt (`$2b$...`) and still verify; `needs_rehash`
//! flags them so login can upgrade them in place.
//!
//! # Performance Considerations
//!
//! Both algorithms are intentionally CPU-intensive. From async code use the
//! `*_async` variants, which run on the blocking thread pool.

use super::error::CredentialMismatch;
use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2,
};
use std::sync::OnceLock;
use tracing::debug;

/// Digest verified when the account does not exist, so that unknown
/// emails cost as much as wrong passwords
static DECOY_DIGEST: OnceLock<String> = OnceLock::new();

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

fn is_bcrypt(digest: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| digest.starts_with(prefix))
}

/// Hashes and checks user passwords.
///
/// Stateless: every call is independent and safe from any thread.
pub struct CredentialManager;

impl CredentialManager {
    /// Hash a password using argon2 (blocking operation)
    ///
    /// The returned digest embeds algorithm, parameters and salt, so it is
    /// all `verify` needs later.
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored digest (blocking operation)
    ///
    /// Any digest that cannot be parsed is a failed verification.
    pub fn verify(password: &str, digest: &str) -> bool {
        if is_bcrypt(digest) {
            return match bcrypt::verify(password, digest) {
                Ok(matched) => matched,
                Err(e) => {
                    debug!(error = %e, "Unreadable bcrypt digest");
                    false
                }
            };
        }

        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Unreadable password digest");
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Like `verify`, but as a `Result` for `?` at call sites
    pub fn check(password: &str, digest: &str) -> Result<(), CredentialMismatch> {
        if Self::verify(password, digest) {
            Ok(())
        } else {
            Err(CredentialMismatch)
        }
    }

    /// Verify a password asynchronously (non-blocking)
    ///
    /// The outer error is only a join failure of the blocking task.
    pub async fn verify_async(password: String, digest: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &digest))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }

    /// Spend one verification's worth of work against a throwaway digest
    pub async fn verify_decoy_async(password: String) -> Result<()> {
        tokio::task::spawn_blocking(move || {
            let digest = DECOY_DIGEST.get_or_init(|| Self::hash("decoy").unwrap_or_default());
            let _ = Self::verify(&password, digest);
        })
        .await
        .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }

    /// Whether a digest should be replaced with a fresh Argon2id one
    pub fn needs_rehash(digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => parsed.algorithm != Algorithm::Argon2id.ident(),
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct-password";
        let hash = CredentialManager::hash(password).unwrap();

        assert!(CredentialManager::verify(password, &hash));
        assert!(!CredentialManager::verify("wrong-password", &hash));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = "test_password";
        let hash1 = CredentialManager::hash(password).unwrap();
        let hash2 = CredentialManager::hash(password).unwrap();

        // Random salt
        assert_ne!(hash1, hash2);

        assert!(CredentialManager::verify(password, &hash1));
        assert!(CredentialManager::verify(password, &hash2));
    }

    #[test]
    fn test_digest_is_self_describing() {
        let hash = CredentialManager::hash("anything").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("anything"));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-digest")]
    #[case("$argon2id$v=19$garbage")]
    #[case("$2b$12$tooshort")]
    #[case("$2b$99$abcdefghijklmnopqrstuuabcdefghijklmnopqrstuvwxyzABCDE")]
    fn test_malformed_digest_fails_verification(#[case] digest: &str) {
        assert!(!CredentialManager::verify("password", digest));
        assert_eq!(
            CredentialManager::check("password", digest),
            Err(CredentialMismatch)
        );
    }

    #[test]
    fn test_verifies_legacy_bcrypt_digest() {
        let legacy = bcrypt::hash("legacy-password", 4).unwrap();

        assert!(CredentialManager::verify("legacy-password", &legacy));
        assert!(!CredentialManager::verify("other-password", &legacy));
        assert!(CredentialManager::needs_rehash(&legacy));
    }

    #[test]
    fn test_fresh_digest_needs_no_rehash() {
        let hash = CredentialManager::hash("password").unwrap();
        assert!(!CredentialManager::needs_rehash(&hash));
    }

    #[test]
    fn test_check_maps_to_mismatch() {
        let hash = CredentialManager::hash("right").unwrap();
        assert!(CredentialManager::check("right", &hash).is_ok());
        assert_eq!(CredentialManager::check("wrong", &hash), Err(CredentialMismatch));
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let password = "async_test_password".to_string();
        let hash = CredentialManager::hash_async(password.clone()).await.unwrap();

        assert!(CredentialManager::verify_async(password.clone(), hash.clone())
            .await
            .unwrap());
        assert!(!CredentialManager::verify_async("wrong".to_string(), hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_decoy_verification_completes() {
        CredentialManager::verify_decoy_async("anything".to_string())
            .await
            .unwrap();
        assert!(DECOY_DIGEST.get().is_some_and(|d| d.starts_with("$argon2id$")));
    }

    // Argon2 is slow in debug builds; keep the case count small
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_hash_verifies_own_plaintext(password in "\\PC{1,64}") {
            let hash = CredentialManager::hash(&password).unwrap();
            prop_assert!(CredentialManager::verify(&password, &hash));
        }

        #[test]
        fn prop_hash_rejects_other_plaintext(
            p1 in "[a-z0-9]{1,32}",
            p2 in "[a-z0-9]{1,32}",
        ) {
            prop_assume!(p1 != p2);
            let hash = CredentialManager::hash(&p2).unwrap();
            prop_assert!(!CredentialManager::verify(&p1, &hash));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_arbitrary_digest_never_panics(digest in "\\PC{0,120}") {
            let _ = CredentialManager::verify("password", &digest);
        }
    }
}
