// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! User profile handlers.

use axum::{extract::State, Json};
use tracing::info;

use crate::{
    auth::Auth,
    error::ApiError,
    models::{MessageResponse, UpdateUsernameRequest},
    state::AppState,
    storage::GraphError,
};

/// Username format: at least 8 characters, letters/digits/underscore/hyphen.
fn username_is_valid(username: &str) -> bool {
    username.len() >= 8
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Set the authenticated user's unique username.
///
/// New accounts carry a placeholder until this is called; once set, the
/// name is reserved until the user picks another.
#[utoipa::path(
    put,
    path = "/api/update-username",
    request_body = UpdateUsernameRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Username updated", body = MessageResponse),
        (status = 400, description = "Invalid format or name taken"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn update_username(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<UpdateUsernameRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !username_is_valid(&request.username) {
        return Err(ApiError::bad_request("Invalid username."));
    }

    state
        .graph
        .update_username(&user.user_id, &request.username)
        .map_err(|e| match e {
            GraphError::AlreadyExists(_) => ApiError::bad_request("Username is already taken."),
            GraphError::NotFound(_) => ApiError::not_found("User not found."),
            other => {
                tracing::error!(error = %other, "username update failed");
                ApiError::internal("An error occurred while updating the username.")
            }
        })?;

    info!(user_id = %user.user_id, "username updated");

    Ok(Json(MessageResponse {
        message: "Username updated successfully.".to_string(),
    }))
}
