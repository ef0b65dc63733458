// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! In-process sliding-window rate limiting for registration traffic.
//!
//! Registration-class endpoints (register, verify-email) are capped at
//! 5 requests per client per 15-minute window. Requests over the cap are
//! rejected before any pipeline component runs. The window slides: each
//! check prunes timestamps older than the window, so a client regains
//! capacity continuously rather than at fixed boundaries.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Default cap: 5 requests per 15 minutes per client.
pub const REGISTRATION_MAX_REQUESTS: usize = 5;
pub const REGISTRATION_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Sliding-window limiter keyed by client identity.
///
/// Parameters are injected at construction. The mutex is held only for map
/// operations and is never held across an await point.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Record a request for `key` and report whether it is within the cap.
    ///
    /// An over-cap request is not recorded, so hammering a limited endpoint
    /// does not extend the lockout.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            // A poisoned lock fails open: limiting is protection, not auth
            Err(_) => return true,
        };

        let entries = windows.entry(key.to_string()).or_default();
        while let Some(front) = entries.front() {
            if now.duration_since(*front) >= self.window {
                entries.pop_front();
            } else {
                break;
            }
        }

        if entries.len() >= self.max_requests {
            return false;
        }

        entries.push_back(now);
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(REGISTRATION_MAX_REQUESTS, REGISTRATION_WINDOW)
    }
}

/// Identify the requesting client: first `X-Forwarded-For` hop when behind
/// a proxy, otherwise the socket peer address.
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Axum middleware guarding registration-class routes.
pub async fn registration_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    if !state.limiter.check(&key) {
        warn!(client = %key, path = %request.uri().path(), "registration rate limit exceeded");
        return ApiError::too_many_requests("Too many email requests, please try again later.")
            .into_response();
    }

    next.run(request).await
}
