//! Password hashing and verification using Argon2id.
//!
//! Hashing is CPU bound, so both operations run on the blocking pool.

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use ledger::{LedgerError, PasswordHasher};
use tracing::error;

/// Argon2id with configurable memory and iteration cost.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
    decoy: String,
}

impl Argon2Hasher {
    /// Hashes a throwaway password once so unknown-email logins can be
    /// verified at the same cost.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, password_hash::Error> {
        let params = Params::new(memory_kib, iterations, 1, None)?;
        let decoy = hash_with(&argon2(&params), &SaltString::generate(&mut OsRng).to_string())?;
        Ok(Self { params, decoy })
    }
}

fn argon2(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

impl PasswordHasher for Argon2Hasher {
    /// Returns the PHC string, which embeds salt and parameters.
    async fn hash(&self, password: &str) -> Result<String, LedgerError> {
        let argon2 = argon2(&self.params);
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hash_with(&argon2, &password))
            .await
            .map_err(|e| {
                error!("Password hashing task failed: {}", e);
                LedgerError::Internal(format!("Password hashing task failed: {e}"))
            })?
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                LedgerError::Internal(format!("Failed to hash password: {e}"))
            })
    }

    async fn verify(&self, hash: &str, password: &str) -> bool {
        let argon2 = argon2(&self.params);
        let hash = hash.to_owned();
        let password = password.to_owned();

        let outcome = tokio::task::spawn_blocking(move || {
            let Ok(parsed) = PasswordHash::new(&hash) else {
                error!("Stored password hash is not a valid PHC string");
                return false;
            };
            argon2.verify_password(password.as_bytes(), &parsed).is_ok()
        })
        .await;

        outcome.unwrap_or_else(|e| {
            error!("Password verification task failed: {}", e);
            false
        })
    }

    fn decoy_hash(&self) -> &str {
        &self.decoy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::new(1024, 1).unwrap()
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("correct-horse-battery-staple").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(&hash, "correct-horse-battery-staple").await);
        assert!(!hasher.verify(&hash, "wrong-password").await);
    }

    #[tokio::test]
    async fn test_different_salts() {
        let hasher = hasher();
        let first = hasher.hash("same-password").await.unwrap();
        let second = hasher.hash("same-password").await.unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&first, "same-password").await);
        assert!(hasher.verify(&second, "same-password").await);
    }

    #[tokio::test]
    async fn test_malformed_hash_never_verifies() {
        assert!(!hasher().verify("not-a-valid-hash", "password").await);
    }

    #[tokio::test]
    async fn test_decoy_is_a_real_hash_with_active_params() {
        let hasher = hasher();

        assert!(hasher.decoy_hash().starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(!hasher.verify(hasher.decoy_hash(), "correct-horse").await);
    }

    #[test]
    fn test_rejects_invalid_params() {
        assert!(Argon2Hasher::new(1, 1).is_err());
        assert!(Argon2Hasher::new(1024, 0).is_err());
    }
}
