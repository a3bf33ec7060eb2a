//! Argon2id password hashing shared by identity store adapters.
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool. Test
//! builds use reduced-cost parameters; release builds use the Argon2 defaults
//! (19 MiB, 2 iterations, 1 lane).

use argon2::password_hash::{
    self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
#[cfg(test)]
use argon2::{Algorithm, Params, Version};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::domain::Password;

/// Errors raised while hashing or verifying passwords.
#[derive(Debug, thiserror::Error)]
pub enum PasswordHashError {
    /// The hasher rejected its input or parameters.
    #[error("password hashing failed: {0}")]
    Hash(password_hash::Error),
    /// A stored hash could not be parsed.
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(password_hash::Error),
    /// The blocking task did not complete.
    #[error("password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn argon2_instance() -> Argon2<'static> {
    #[cfg(test)]
    {
        match Params::new(1024, 1, 1, None) {
            Ok(params) => Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            Err(_) => Argon2::default(),
        }
    }

    #[cfg(not(test))]
    {
        Argon2::default()
    }
}

fn hash_blocking(secret: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2_instance()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordHashError::Hash)
}

fn verify_blocking(secret: &str, stored: &str) -> Result<bool, PasswordHashError> {
    let parsed = PasswordHash::new(stored).map_err(PasswordHashError::MalformedHash)?;
    match argon2_instance().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(other) => Err(PasswordHashError::Hash(other)),
    }
}

/// Hash `password` into a PHC string.
pub async fn hash_password(password: &Password) -> Result<String, PasswordHashError> {
    let secret = Zeroizing::new(password.expose().to_owned());
    tokio::task::spawn_blocking(move || hash_blocking(&secret)).await?
}

/// Check `password` against a stored PHC string.
pub async fn verify_password(password: &Password, stored: &str) -> Result<bool, PasswordHashError> {
    let secret = Zeroizing::new(password.expose().to_owned());
    let stored = stored.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&secret, &stored)).await?
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn password(raw: &str) -> Password {
        Password::new(raw).expect("non-empty password")
    }

    #[rstest]
    #[tokio::test]
    async fn hash_verifies_only_the_original_password() {
        let hash = hash_password(&password("P@ssw0rd")).await.expect("hash");
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password(&password("P@ssw0rd"), &hash).await.expect("verify"));
        assert!(!verify_password(&password("wrong"), &hash).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn salts_differ_between_hashes() {
        let first = hash_password(&password("same")).await.expect("hash");
        let second = hash_password(&password("same")).await.expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let result = verify_password(&password("P@ssw0rd"), "not-a-phc-string").await;
        assert!(matches!(result, Err(PasswordHashError::MalformedHash(_))));
    }
}
