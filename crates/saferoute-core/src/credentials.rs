//! Admin credential helpers: Argon2id password hashes and opaque session tokens.
//!
//! Passwords are stored as PHC strings carrying their own random salt and cost
//! parameters. Session tokens are random and only their SHA-256 digest is
//! persisted, so a leaked `admin_sessions` table cannot be replayed as bearer
//! tokens.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sha2::{Digest, Sha256};

use crate::CoreError;

/// Number of random bytes in a session token (hex-encoded to 64 chars).
const SESSION_TOKEN_BYTES: usize = 32;

const PASSWORD_SALT_BYTES: usize = 16;

/// Well-formed hash no password matches. Verified against when the username
/// is unknown so both login failures cost one Argon2 run.
const UNMATCHABLE_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hashes `password` with Argon2id and a fresh per-password salt.
///
/// # Errors
///
/// Returns [`CoreError::PasswordHash`] if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt_bytes: [u8; PASSWORD_SALT_BYTES] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| CoreError::PasswordHash(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string. A malformed stored hash
/// never verifies.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
            false
        }
    }
}

/// Spends the same work as [`verify_password`] and always fails.
#[must_use]
pub fn verify_unknown_user(password: &str) -> bool {
    verify_password(password, UNMATCHABLE_HASH)
}

/// Fresh random bearer token, hex encoded.
#[must_use]
pub fn generate_session_token() -> String {
    let bytes: [u8; SESSION_TOKEN_BYTES] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Digest stored in place of the raw bearer token.
#[must_use]
pub fn hash_session_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_password_produces_argon2id_phc_string() {
        let stored = hash_password("hunter22").unwrap();
        assert!(stored.starts_with("$argon2id$v=19$"), "{stored}");
        assert!(!stored.contains("hunter22"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("correct horse").unwrap();
        let b = hash_password("correct horse").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("correct horse", &a));
        assert!(verify_password("correct horse", &b));
    }

    #[test]
    fn verify_password_rejects_wrong_password() {
        let stored = hash_password("correct horse").unwrap();
        assert!(!verify_password("wrong horse", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password(
            "anything",
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        ));
    }

    #[test]
    fn unknown_user_check_runs_argon2_and_fails() {
        assert!(PasswordHash::new(UNMATCHABLE_HASH).is_ok());
        assert!(!verify_unknown_user("hunter22"));
        assert!(!verify_unknown_user(""));
    }

    #[test]
    fn session_tokens_are_unique_hex() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), SESSION_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn token_digest_differs_from_token() {
        let token = generate_session_token();
        let digest = hash_session_token(&token);
        assert_ne!(token, digest);
        assert_eq!(digest, hash_session_token(&token));
    }
}
