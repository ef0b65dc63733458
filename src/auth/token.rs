// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! Session token issuance and verification.
//!
//! Tokens are self-contained HS256 JWTs carrying the user identity claim.
//! There is no server-side session state: verification is a pure function
//! of the token, the shared secret, and the wall clock. Expired tokens are
//! rejected with `TokenExpired`, never confused with signature failures.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Default session lifetime: one hour from issuance.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Claim set carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user's opaque id.
    pub sub: String,
    /// Email bound to the session.
    pub email: String,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Absolute expiry (Unix seconds).
    pub exp: i64,
}

/// Issues and verifies signed session tokens.
///
/// The signing secret is injected at construction; nothing reads it from
/// the environment after startup.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token for a user with the service's default TTL.
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String, AuthError> {
        self.issue_with_ttl(user_id, email, self.ttl)
    }

    /// Issue a token with an explicit TTL.
    pub fn issue_with_ttl(
        &self,
        user_id: &str,
        email: &str,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token encoding failed: {e}")))
    }

    /// Verify a token and return its claims.
    ///
    /// Expiry is exact: a token is rejected from its `exp` instant onward
    /// (zero leeway), and elapsed time alone never surfaces as a signature
    /// or malformed-token error.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?;

        Ok(token_data.claims)
    }
}
