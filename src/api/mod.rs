// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        HabitItem, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
        SaveHabitsRequest, UpdateUsernameRequest, UserHabitsResponse, UserProfile,
        VerifyEmailRequest, VerifyEmailResponse,
    },
    ratelimit::registration_rate_limit,
    state::AppState,
};

pub mod habits;
pub mod health;
pub mod register;
pub mod session;
pub mod users;

/// Root greeting, useful as a smoke check that the service is up.
async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the HabitSphere API".to_string(),
    })
}

pub fn router(state: AppState) -> Router {
    // Only the endpoints that trigger outbound mail sit behind the limiter.
    let registration = Router::new()
        .route("/register", post(register::register))
        .route("/verify-email", post(register::verify_email))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            registration_rate_limit,
        ));

    let api_routes = Router::new()
        .route("/login", post(session::login))
        .route("/logout", post(session::logout))
        .route("/update-username", put(users::update_username))
        .route("/habits", get(habits::list_habits))
        .route("/save-habits", post(habits::save_habits))
        .route("/user-habits", get(habits::user_habits))
        .merge(registration);

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        register::register,
        register::verify_email,
        session::login,
        session::logout,
        users::update_username,
        habits::list_habits,
        habits::save_habits,
        habits::user_habits,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            RegisterRequest,
            VerifyEmailRequest,
            VerifyEmailResponse,
            LoginRequest,
            LoginResponse,
            UserProfile,
            UpdateUsernameRequest,
            HabitItem,
            SaveHabitsRequest,
            UserHabitsResponse,
            MessageResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Registration", description = "Account registration and email verification"),
        (name = "Session", description = "Login and logout"),
        (name = "Users", description = "User profile management"),
        (name = "Habits", description = "Habit catalog and user habit links"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
