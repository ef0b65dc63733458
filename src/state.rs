// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

use std::sync::Arc;

use crate::auth::TokenService;
use crate::mailer::Mailer;
use crate::ratelimit::RateLimiter;
use crate::storage::{GraphStore, PendingStore};

/// Shared application state, cloned per request.
///
/// Everything is behind an `Arc` (or internally cheap to clone); handlers
/// never take ownership of the underlying stores.
#[derive(Clone)]
pub struct AppState {
    /// Durable graph store: users, habits, HAS edges.
    pub graph: Arc<GraphStore>,
    /// Transient pending-registration cache.
    pub pending: Arc<PendingStore>,
    /// Session token issuance/verification.
    pub tokens: TokenService,
    /// Outbound verification mail.
    pub mailer: Arc<dyn Mailer>,
    /// Registration-class rate limiter.
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(graph: GraphStore, tokens: TokenService, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            graph: Arc::new(graph),
            pending: Arc::new(PendingStore::default()),
            tokens,
            mailer,
            limiter: Arc::new(RateLimiter::default()),
        }
    }

    /// Replace the pending store (tests use short TTLs).
    pub fn with_pending(mut self, pending: PendingStore) -> Self {
        self.pending = Arc::new(pending);
        self
    }

    /// Replace the rate limiter (tests use tight caps).
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Arc::new(limiter);
        self
    }

    /// Replace the mailer.
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }
}

#[cfg(test)]
pub mod testutil {
    use super::*;
    use crate::auth::SESSION_TTL;
    use crate::mailer::LogMailer;

    /// Build a test state over a temp-dir graph store.
    ///
    /// The `TempDir` must stay alive for the duration of the test.
    pub fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let graph = GraphStore::open(&dir.path().join("test.redb")).expect("failed to open store");
        let tokens = TokenService::new("test-secret", SESSION_TTL);
        let state = AppState::new(graph, tokens, Arc::new(LogMailer));
        (state, dir)
    }
}
