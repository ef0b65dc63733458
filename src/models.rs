// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation. Wire field names are camelCase, matching the web client.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Registration Models
// =============================================================================

/// Request to start a registration (phase one of the verification flow).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// Must equal `email`; checked before any store access.
    pub confirm_email: String,
    /// Must equal `password`; checked before any store access.
    pub confirm_password: String,
}

/// Request to redeem a verification code (phase two).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub email: String,
    /// 6-digit numeric code from the verification mail.
    pub code: String,
}

/// Response carrying a freshly issued session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyEmailResponse {
    pub message: String,
    pub token: String,
}

// =============================================================================
// Session Models
// =============================================================================

/// Request to sign in with verified credentials.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public profile slice returned on login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Response for a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

// =============================================================================
// Profile Models
// =============================================================================

/// Request to set the user's unique username.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateUsernameRequest {
    pub username: String,
}

// =============================================================================
// Habit Models
// =============================================================================

/// A habit from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HabitItem {
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Request to link the authenticated user to a set of habits.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveHabitsRequest {
    /// Habit names to link. Must be non-empty; duplicates are harmless.
    pub habits: Vec<String>,
}

/// The authenticated user's linked habit names.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserHabitsResponse {
    pub habits: Vec<String>,
}

// =============================================================================
// Generic Models
// =============================================================================

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
