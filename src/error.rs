// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::GraphError;

/// HTTP-boundary error: a status code and a client-safe message.
///
/// Internal detail never rides in here; persistence failures are logged at
/// the call site and mapped to a generic message via [`ApiError::from`].
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<GraphError> for ApiError {
    /// Map a durable-store failure to a client response.
    ///
    /// `NotFound`/`AlreadyExists` carry their own messages; everything else
    /// is a persistence error: logged with detail, reported generically.
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            GraphError::AlreadyExists(what) => ApiError::conflict(format!("{what} already exists")),
            other => {
                tracing::error!(error = %other, "graph store operation failed");
                ApiError::internal("An unexpected storage error occurred")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
