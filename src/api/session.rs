// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! Login and logout handlers.
//!
//! Sessions are stateless tokens, so logout verifies and acknowledges but
//! stores nothing — there is no revocation list.

use axum::{extract::State, http::HeaderMap, Json};
use tracing::info;

use crate::{
    auth::{verify_password, AuthError},
    error::ApiError,
    models::{LoginRequest, LoginResponse, MessageResponse, UserProfile},
    state::AppState,
};

/// Sign in with email and password.
///
/// Unknown email and wrong password produce the identical response, so the
/// endpoint leaks nothing about which emails are registered.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    tag = "Session",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing or invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = state
        .graph
        .get_user_by_email(&request.email)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::bad_request("Invalid email or password"))?;

    if !verify_password(&request.password, &user.hashed_password) {
        return Err(ApiError::bad_request("Invalid email or password"));
    }

    let token = state.tokens.issue(&user.id, &user.email).map_err(|e| {
        tracing::error!(error = %e, "token issuance failed during login");
        ApiError::internal("An unexpected error occurred during sign-in")
    })?;

    info!(user_id = %user.id, "login");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserProfile {
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        },
    }))
}

/// Acknowledge a logout.
///
/// The bearer token is verified so an expired session gets a distinct
/// response, but nothing is stored or revoked.
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 400, description = "Missing, invalid, or expired token"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| ApiError::bad_request("Token is required for logout"))?;

    match state.tokens.verify(token) {
        Ok(_) => Ok(Json(MessageResponse {
            message: "Logout successful".to_string(),
        })),
        Err(AuthError::TokenExpired) => Err(ApiError::bad_request("Token has already expired")),
        Err(_) => Err(ApiError::bad_request("Invalid token")),
    }
}
