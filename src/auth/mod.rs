// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! # Authentication Module
//!
//! Credential hashing and stateless session tokens for the HabitSphere API.
//!
//! ## Auth Flow
//!
//! 1. Client registers and verifies its email (see `api::register`)
//! 2. Server issues an HS256 session token bound to the new user id
//! 3. Client sends `Authorization: Bearer <token>` on subsequent requests
//! 4. The [`Auth`] extractor verifies signature and expiry before any
//!    handler logic runs
//!
//! ## Security
//!
//! - Passwords are hashed with Argon2id, salted per call, never stored or
//!   logged in plaintext
//! - Tokens expire one hour after issuance; there is no revocation list
//! - The signing secret is injected at construction, not read from globals

pub mod error;
pub mod extractor;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use extractor::{Auth, AuthenticatedUser};
pub use password::{hash_password, verify_password};
pub use token::{SessionClaims, TokenService, SESSION_TTL};
