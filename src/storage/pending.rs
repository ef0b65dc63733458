// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! In-process store for registrations awaiting email verification.
//!
//! Keyed by email, one entry per email at a time. Entries expire by
//! comparing the stored insertion instant against the TTL on every access;
//! there are no background timers, so expiry behaves the same under paused
//! schedulers and in tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long a verification code stays redeemable.
pub const PENDING_TTL: Duration = Duration::from_secs(10 * 60);

/// Unconfirmed registration data plus its one-time verification code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Argon2 digest, hashed before the entry is stored.
    pub hashed_password: String,
    /// 6-digit numeric code sent to the user's address.
    pub verification_code: String,
    pub created_at: Instant,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PendingError {
    /// No pending entry: never registered, expired, or already consumed.
    #[error("no pending registration for this email")]
    NotFound,

    /// Supplied code does not match. The entry is retained so the user can
    /// retry until it expires.
    #[error("verification code does not match")]
    CodeMismatch,
}

/// Process-wide cache of pending registrations.
///
/// The mutex is held only for map operations, never across an await point,
/// which gives the single-owner-per-key guarantee `consume` relies on.
pub struct PendingStore {
    entries: Mutex<HashMap<String, PendingRegistration>>,
    ttl: Duration,
}

impl PendingStore {
    /// Create a store with the given entry TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert a pending registration, superseding any existing entry for the
    /// same email. A superseded entry's code is dead from this point on.
    pub fn put(&self, registration: PendingRegistration) {
        let key = registration.email.to_lowercase();
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, registration);
        }
    }

    /// Redeem the verification code for an email.
    ///
    /// On a match the entry is removed and returned, exactly once: a second
    /// call for the same email yields `NotFound`. On a mismatch the entry
    /// stays, allowing retries until expiry. Expired entries are removed on
    /// access and reported as `NotFound`.
    pub fn consume(&self, email: &str, code: &str) -> Result<PendingRegistration, PendingError> {
        let key = email.to_lowercase();
        let mut entries = self.entries.lock().map_err(|_| PendingError::NotFound)?;

        let entry = entries.get(&key).ok_or(PendingError::NotFound)?;

        if entry.created_at.elapsed() >= self.ttl {
            entries.remove(&key);
            return Err(PendingError::NotFound);
        }

        if entry.verification_code != code {
            return Err(PendingError::CodeMismatch);
        }

        // Match: remove under the same lock so redemption is exactly-once
        entries.remove(&key).ok_or(PendingError::NotFound)
    }

    /// Whether a live (unexpired) entry exists for this email.
    pub fn contains(&self, email: &str) -> bool {
        let key = email.to_lowercase();
        match self.entries.lock() {
            Ok(entries) => entries
                .get(&key)
                .map(|e| e.created_at.elapsed() < self.ttl)
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}

impl Default for PendingStore {
    fn default() -> Self {
        Self::new(PENDING_TTL)
    }
}
