//! Credential hashing for stored accounts.
//!
//! Passwords are hashed with Argon2id (per-record random salt, default cost
//! parameters) and stored as PHC strings. Hashing and verification run on
//! `spawn_blocking` because Argon2 is CPU-intensive and would stall the async
//! runtime if run inline.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tokio::task;

/// A syntactically valid Argon2id record that matches no password. Burned on
/// lookups for unknown usernames so both 401 paths cost about the same.
pub(crate) const PHANTOM_HASH: &str = concat!(
    "$argon2id$v=19$m=19456,t=2,p=1",
    "$AAAAAAAAAAAAAAAAAAAAAA",
    "$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
);

/// Hash a plaintext password into a PHC string.
pub async fn hash(plaintext: &str) -> Result<String> {
    let password = plaintext.to_string();

    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| anyhow!("failed to hash password: {err}"))
    })
    .await
    .context("password hashing task panicked")?
}

/// Verify a plaintext password against a stored PHC record. A record that
/// fails to parse counts as a mismatch, never as an error the caller can
/// distinguish.
pub async fn verify(plaintext: &str, hash_record: &str) -> bool {
    let password = plaintext.to_string();
    let record = hash_record.to_string();

    task::spawn_blocking(move || {
        PasswordHash::new(&record).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    })
    .await
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_verifies() {
        let record = hash("S3cret!").await.unwrap();
        assert!(verify("S3cret!", &record).await);
    }

    #[tokio::test]
    async fn rejects_different_password() {
        let record = hash("S3cret!").await.unwrap();
        assert!(!verify("not-the-password", &record).await);
    }

    #[tokio::test]
    async fn salts_are_per_record() {
        let first = hash("same-password").await.unwrap();
        let second = hash("same-password").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn handles_long_passwords() {
        let long = "x".repeat(72);
        let record = hash(&long).await.unwrap();
        assert!(verify(&long, &record).await);
    }

    #[tokio::test]
    async fn phantom_hash_parses_and_matches_nothing() {
        assert!(PasswordHash::new(PHANTOM_HASH).is_ok());
        assert!(!verify("anything", PHANTOM_HASH).await);
        assert!(!verify("", PHANTOM_HASH).await);
    }

    #[tokio::test]
    async fn malformed_record_is_a_mismatch() {
        assert!(!verify("S3cret!", "not-a-phc-string").await);
    }
}
