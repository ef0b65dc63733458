// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! Habit catalog and habit association handlers.
//!
//! Linking is "merge what matches": names without a catalog entry are
//! skipped, duplicate links are no-ops, and all links of one request commit
//! in a single store transaction.

use axum::{extract::State, Json};
use tracing::info;

use crate::{
    auth::Auth,
    error::ApiError,
    models::{HabitItem, MessageResponse, SaveHabitsRequest, UserHabitsResponse},
    state::AppState,
    storage::GraphError,
};

/// List the habit catalog.
#[utoipa::path(
    get,
    path = "/api/habits",
    tag = "Habits",
    responses(
        (status = 200, description = "All habits", body = [HabitItem]),
    )
)]
pub async fn list_habits(
    State(state): State<AppState>,
) -> Result<Json<Vec<HabitItem>>, ApiError> {
    let habits = state.graph.list_habits().map_err(ApiError::from)?;
    Ok(Json(
        habits
            .into_iter()
            .map(|h| HabitItem {
                name: h.name,
                created_at: h.created_at,
            })
            .collect(),
    ))
}

/// Link the authenticated user to the given habits.
///
/// One atomic operation: either every matching name is linked or none is.
/// Re-running with overlapping names is harmless.
#[utoipa::path(
    post,
    path = "/api/save-habits",
    request_body = SaveHabitsRequest,
    tag = "Habits",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Habits saved", body = MessageResponse),
        (status = 400, description = "Empty habit list"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn save_habits(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<SaveHabitsRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.habits.is_empty() {
        return Err(ApiError::bad_request("Invalid or empty habit list"));
    }

    let linked = state
        .graph
        .save_habits(&user.user_id, &request.habits)
        .map_err(|e| match e {
            GraphError::NotFound(_) => ApiError::not_found("User not found"),
            other => {
                tracing::error!(error = %other, "failed to save habits");
                ApiError::internal("Failed to save habits")
            }
        })?;

    info!(user_id = %user.user_id, linked = linked.len(), "habits saved");

    Ok(Json(MessageResponse {
        message: "Habits saved successfully!".to_string(),
    }))
}

/// List the authenticated user's linked habits.
#[utoipa::path(
    get,
    path = "/api/user-habits",
    tag = "Habits",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The user's habits", body = UserHabitsResponse),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn user_habits(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserHabitsResponse>, ApiError> {
    let habits = state
        .graph
        .user_habits(&user.user_id)
        .map_err(ApiError::from)?;
    Ok(Json(UserHabitsResponse { habits }))
}
