// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! Password hashing (Argon2id).
//!
//! Digests are one-way and salted per call: hashing the same plaintext
//! twice yields different digests, and both verify. Verification never
//! errors on a malformed digest, it just fails.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::AuthError;

/// Hash a plaintext password with a fresh random salt.
///
/// The work factor is Argon2id's default parameter set, which is tuned for
/// interactive logins.
pub fn hash_password(plaintext: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| AuthError::InternalError(format!("password hashing failed: {e}")))?;
    Ok(digest.to_string())
}

/// Verify a plaintext password against a stored digest.
///
/// Returns `false` for a non-matching password and for a digest that does
/// not parse; comparison is constant-time inside the argon2 crate.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let digest = hash_password("Secret1!").unwrap();
        assert!(verify_password("Secret1!", &digest));
        assert!(!verify_password("Secret2!", &digest));
    }

    #[test]
    fn same_password_different_digests() {
        let a = hash_password("Secret1!").unwrap();
        let b = hash_password("Secret1!").unwrap();
        assert_ne!(a, b, "salt must be randomized per call");
        assert!(verify_password("Secret1!", &a));
        assert!(verify_password("Secret1!", &b));
    }

    #[test]
    fn malformed_digest_fails_closed() {
        assert!(!verify_password("Secret1!", "not-a-digest"));
        assert!(!verify_password("Secret1!", ""));
        assert!(!verify_password("Secret1!", "$argon2id$garbage"));
    }
}
