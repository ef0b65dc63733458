// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! Registration and email verification handlers.
//!
//! The two-phase identity pipeline:
//!
//! 1. **Register** — validate input, check the durable store for the email,
//!    hash the password, stash a pending registration with a one-time code,
//!    dispatch the code by mail.
//! 2. **Verify** — redeem the code, promote the pending registration to a
//!    durable user node, issue a session token.
//!
//! State per email: no registration → pending → verified. Expiry and
//! superseding re-registration both fold back to "no registration".

use axum::{extract::State, Json};
use rand::Rng;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::hash_password,
    error::ApiError,
    models::{MessageResponse, RegisterRequest, VerifyEmailRequest, VerifyEmailResponse},
    state::AppState,
    storage::{PendingError, PendingRegistration, StoredUser, PLACEHOLDER_USERNAME},
};

/// Subject line of the verification mail.
const VERIFICATION_SUBJECT: &str = "HabitSphere Email Verification";

/// Validate a registration request. Runs before any store access; the
/// first failed rule is reported.
fn validate_registration(request: &RegisterRequest) -> Result<(), ApiError> {
    if !email_address::EmailAddress::is_valid(&request.email) {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    if request.email != request.confirm_email {
        return Err(ApiError::bad_request("Emails do not match"));
    }
    if request.password != request.confirm_password {
        return Err(ApiError::bad_request("Passwords do not match"));
    }
    if !password_meets_policy(&request.password) {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters, include uppercase, lowercase, numbers, and symbols",
        ));
    }
    Ok(())
}

/// Minimum-strength policy: length ≥ 8 with at least one lowercase letter,
/// one uppercase letter, one digit, and one symbol.
fn password_meets_policy(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}

/// Generate a 6-digit numeric verification code.
fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Start a registration.
///
/// On success a pending registration is cached for 10 minutes and the
/// verification code is dispatched by mail. A delivery failure is logged
/// but neither rolls back the pending entry nor fails the request.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    tag = "Registration",
    responses(
        (status = 200, description = "Verification code sent", body = MessageResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered"),
        (status = 429, description = "Rate limit exceeded"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_registration(&request)?;

    if state.graph.email_exists(&request.email).map_err(ApiError::from)? {
        return Err(ApiError::conflict("Email is already registered"));
    }

    let hashed_password = hash_password(&request.password).map_err(|e| {
        error!(error = %e, "password hashing failed during registration");
        ApiError::internal("An unexpected error occurred during registration")
    })?;

    let code = generate_verification_code();
    state.pending.put(PendingRegistration {
        email: request.email.clone(),
        first_name: request.first_name,
        last_name: request.last_name,
        hashed_password,
        verification_code: code.clone(),
        created_at: Instant::now(),
    });

    // Best-effort dispatch: the pending entry stays either way
    let body = format!("Your verification code is: {code}");
    if let Err(e) = state
        .mailer
        .send(&request.email, VERIFICATION_SUBJECT, &body)
        .await
    {
        warn!(error = %e, email = %request.email, "verification mail delivery failed");
    }

    Ok(Json(MessageResponse {
        message: "Verification code sent to email".to_string(),
    }))
}

/// Redeem a verification code and create the durable user.
///
/// A matching code is consumed exactly once; if durable creation then
/// fails, the pending entry is already gone and the user must re-register
/// (accepted at-most-once gap).
#[utoipa::path(
    post,
    path = "/api/verify-email",
    request_body = VerifyEmailRequest,
    tag = "Registration",
    responses(
        (status = 200, description = "User created, session token issued", body = VerifyEmailResponse),
        (status = 400, description = "Missing, unknown, or mismatched code"),
        (status = 429, description = "Rate limit exceeded"),
    )
)]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<VerifyEmailResponse>, ApiError> {
    if request.email.is_empty() || request.code.is_empty() {
        return Err(ApiError::bad_request(
            "Email and verification code are required",
        ));
    }

    let pending = state
        .pending
        .consume(&request.email, &request.code)
        .map_err(|e| match e {
            PendingError::NotFound => {
                ApiError::bad_request("No verification code found for this email")
            }
            PendingError::CodeMismatch => ApiError::bad_request("Invalid verification code"),
        })?;

    let user = StoredUser {
        id: Uuid::new_v4().to_string(),
        email: pending.email,
        first_name: pending.first_name,
        last_name: pending.last_name,
        username: PLACEHOLDER_USERNAME.to_string(),
        hashed_password: pending.hashed_password,
        created_at: chrono::Utc::now(),
    };

    state.graph.create_user(&user).map_err(|e| {
        error!(error = %e, "failed to create user after verification");
        ApiError::internal("Failed to create user in the database")
    })?;

    let token = state.tokens.issue(&user.id, &user.email).map_err(|e| {
        error!(error = %e, "token issuance failed after user creation");
        ApiError::internal("An unexpected error occurred during verification")
    })?;

    info!(user_id = %user.id, "user created from verified registration");

    Ok(Json(VerifyEmailResponse {
        message: "Email verified and user created successfully".to_string(),
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::{MailError, Mailer};
    use crate::state::testutil::test_state;
    use axum::http::StatusCode;
    use std::sync::{Arc, Mutex};

    /// Mailer double that records every dispatched message.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingMailer {
        fn messages(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }

        /// Pull the 6-digit code out of the latest mail body.
        fn last_code(&self) -> String {
            let sent = self.sent.lock().unwrap();
            let (_, body) = sent.last().expect("no mail recorded");
            body.rsplit(' ').next().unwrap().to_string()
        }
    }

    #[async_trait::async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, _subject: &str, body: &str) -> Result<(), MailError> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    /// Mailer double that always fails delivery.
    struct FailingMailer;

    #[async_trait::async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), MailError> {
            Err(MailError("relay unreachable".to_string()))
        }
    }

    fn valid_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "Secret1!".to_string(),
            confirm_email: email.to_string(),
            confirm_password: "Secret1!".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_verify_creates_user() {
        let (state, _dir) = test_state();
        let mailer = Arc::new(RecordingMailer::default());
        let state = state.with_mailer(mailer.clone());

        register(State(state.clone()), Json(valid_request("ada@example.com")))
            .await
            .expect("register succeeds");

        assert_eq!(mailer.messages().len(), 1);
        let code = mailer.last_code();
        assert_eq!(code.len(), 6);

        let Json(response) = verify_email(
            State(state.clone()),
            Json(VerifyEmailRequest {
                email: "ada@example.com".to_string(),
                code,
            }),
        )
        .await
        .expect("verify succeeds");

        // Durable user exists with the placeholder username
        let user = state
            .graph
            .get_user_by_email("ada@example.com")
            .unwrap()
            .expect("user created");
        assert_eq!(user.username, PLACEHOLDER_USERNAME);
        assert_eq!(user.first_name, "Ada");

        // The issued token is bound to the new user
        let claims = state.tokens.verify(&response.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "ada@example.com");
    }

    #[tokio::test]
    async fn mismatched_confirm_email_rejected_before_store_access() {
        let (state, _dir) = test_state();
        let mailer = Arc::new(RecordingMailer::default());
        let state = state.with_mailer(mailer.clone());

        let mut request = valid_request("a@x.com");
        request.confirm_email = "b@x.com".to_string();

        let err = register(State(state.clone()), Json(request)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Emails do not match");

        // No pending entry, no mail
        assert!(!state.pending.contains("a@x.com"));
        assert!(mailer.messages().is_empty());
    }

    #[tokio::test]
    async fn weak_passwords_rejected() {
        let (state, _dir) = test_state();

        for password in ["short1!", "nouppercase1!", "NOLOWERCASE1!", "NoDigits!!", "NoSymbol11"] {
            let mut request = valid_request("ada@example.com");
            request.password = password.to_string();
            request.confirm_password = password.to_string();

            let err = register(State(state.clone()), Json(request)).await.unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "password {password:?}");
        }
    }

    #[tokio::test]
    async fn existing_email_conflicts_without_pending_entry() {
        let (state, _dir) = test_state();
        let mailer = Arc::new(RecordingMailer::default());
        let state = state.with_mailer(mailer.clone());

        // Register + verify a first account
        register(State(state.clone()), Json(valid_request("ada@example.com")))
            .await
            .unwrap();
        verify_email(
            State(state.clone()),
            Json(VerifyEmailRequest {
                email: "ada@example.com".to_string(),
                code: mailer.last_code(),
            }),
        )
        .await
        .unwrap();

        // A second registration for the same email conflicts
        let err = register(State(state.clone()), Json(valid_request("ada@example.com")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert!(!state.pending.contains("ada@example.com"));
    }

    #[tokio::test]
    async fn reregistration_supersedes_previous_code() {
        let (state, _dir) = test_state();
        let mailer = Arc::new(RecordingMailer::default());
        let state = state.with_mailer(mailer.clone());

        register(State(state.clone()), Json(valid_request("ada@example.com")))
            .await
            .unwrap();
        let first_code = mailer.last_code();

        register(State(state.clone()), Json(valid_request("ada@example.com")))
            .await
            .unwrap();
        let second_code = mailer.last_code();

        if first_code != second_code {
            // The superseded code is dead
            let err = verify_email(
                State(state.clone()),
                Json(VerifyEmailRequest {
                    email: "ada@example.com".to_string(),
                    code: first_code,
                }),
            )
            .await
            .unwrap_err();
            assert_eq!(err.message, "Invalid verification code");
        }

        verify_email(
            State(state.clone()),
            Json(VerifyEmailRequest {
                email: "ada@example.com".to_string(),
                code: second_code,
            }),
        )
        .await
        .expect("current code verifies");
    }

    #[tokio::test]
    async fn verification_code_is_single_use() {
        let (state, _dir) = test_state();
        let mailer = Arc::new(RecordingMailer::default());
        let state = state.with_mailer(mailer.clone());

        register(State(state.clone()), Json(valid_request("ada@example.com")))
            .await
            .unwrap();
        let code = mailer.last_code();

        verify_email(
            State(state.clone()),
            Json(VerifyEmailRequest {
                email: "ada@example.com".to_string(),
                code: code.clone(),
            }),
        )
        .await
        .unwrap();

        // Replay with the correct code reports no pending registration
        let err = verify_email(
            State(state.clone()),
            Json(VerifyEmailRequest {
                email: "ada@example.com".to_string(),
                code,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "No verification code found for this email");
    }

    #[tokio::test]
    async fn wrong_code_allows_retry() {
        let (state, _dir) = test_state();
        let mailer = Arc::new(RecordingMailer::default());
        let state = state.with_mailer(mailer.clone());

        register(State(state.clone()), Json(valid_request("ada@example.com")))
            .await
            .unwrap();
        let code = mailer.last_code();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        let err = verify_email(
            State(state.clone()),
            Json(VerifyEmailRequest {
                email: "ada@example.com".to_string(),
                code: wrong.to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Invalid verification code");

        // The entry survives the mismatch
        verify_email(
            State(state.clone()),
            Json(VerifyEmailRequest {
                email: "ada@example.com".to_string(),
                code,
            }),
        )
        .await
        .expect("correct code still works");
    }

    #[tokio::test]
    async fn mail_failure_does_not_fail_registration() {
        let (state, _dir) = test_state();
        let state = state.with_mailer(Arc::new(FailingMailer));

        register(State(state.clone()), Json(valid_request("ada@example.com")))
            .await
            .expect("registration succeeds despite mail failure");

        // The pending entry is intact
        assert!(state.pending.contains("ada@example.com"));
    }

    #[tokio::test]
    async fn missing_fields_rejected() {
        let (state, _dir) = test_state();

        let err = verify_email(
            State(state.clone()),
            Json(VerifyEmailRequest {
                email: String::new(),
                code: "123456".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn verification_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_verification_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
