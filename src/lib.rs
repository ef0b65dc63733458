// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! HabitSphere - Habit Tracker Identity Service
//!
//! This crate provides the account backend for the HabitSphere habit
//! tracker: two-phase email registration, stateless JWT sessions, and a
//! graph of users linked to the habits they track.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Passwords, session tokens, and the bearer-token extractor
//! - `mailer` - Outbound verification mail (SMTP or log-only)
//! - `storage` - Embedded graph store (redb) and the pending-registration cache

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod models;
pub mod ratelimit;
pub mod state;
pub mod storage;
