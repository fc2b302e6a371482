use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::store::{AuthState, ProfileUpdate, SocialProvider, User, UserRole};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::notify_failure;
use super::validation::{validate_email, validate_required};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Sign in against the credential table and establish the session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthState>, ApiError> {
    match state.identity.sign_in(&req.email, &req.password).await {
        Ok(_) => {
            state.notifier.success("Successfully signed in");
            Ok(Json(state.identity.auth_state()))
        }
        Err(e) => Err(notify_failure(&state, e.into())),
    }
}

/// Register a new student or teacher account and sign it in.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthState>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_required(&req.name, "Name") {
        errors.add("name", e);
    }
    if let Err(e) = validate_email(&req.email) {
        errors.add("email", e);
    }
    if let Err(e) = validate_required(&req.password, "Password") {
        errors.add("password", e);
    }
    if let Err(api) = errors.finish() {
        return Err(notify_failure(&state, api));
    }

    match state
        .identity
        .sign_up(&req.name, &req.email, &req.password, req.role)
        .await
    {
        Ok(_) => {
            state.notifier.success("Account created successfully");
            Ok((StatusCode::CREATED, Json(state.identity.auth_state())))
        }
        Err(e) => Err(notify_failure(&state, e.into())),
    }
}

/// Tear down the session. Always succeeds.
pub async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.identity.sign_out().await;
    state.notifier.success("Signed out successfully");
    StatusCode::NO_CONTENT
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    match state.identity.reset_password(&req.email).await {
        Ok(()) => {
            state
                .notifier
                .success("Password reset instructions sent to your email");
            Ok(StatusCode::ACCEPTED)
        }
        Err(e) => Err(notify_failure(&state, e.into())),
    }
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    if let Some(email) = req.email.as_deref() {
        if let Err(e) = validate_email(email) {
            let mut errors = ValidationErrorBuilder::new();
            errors.add("email", e);
            return Err(notify_failure(&state, errors.finish().unwrap_err()));
        }
    }

    match state.identity.update_profile(req).await {
        Ok(user) => {
            state.notifier.success("Profile updated successfully");
            Ok(Json(user))
        }
        Err(e) => Err(notify_failure(&state, e.into())),
    }
}

/// Federated login. No provider is configured in this deployment, so this
/// reports not-implemented rather than impersonating a demo account.
pub async fn social_sign_in(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<SocialProvider>,
) -> Result<Json<AuthState>, ApiError> {
    match state.identity.social_sign_in(provider).await {
        Ok(_) => {
            state.notifier.success(format!("Signed in with {provider}"));
            Ok(Json(state.identity.auth_state()))
        }
        Err(e) => Err(notify_failure(&state, e.into())),
    }
}

/// Session introspection for UI bootstrapping. Pure lookup, no notification.
pub async fn session(State(state): State<Arc<AppState>>) -> Json<AuthState> {
    Json(state.identity.auth_state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorCode;
    use crate::config::{Config, ServerConfig};
    use crate::notifications::NotificationKind;
    use tempfile::TempDir;

    fn test_state() -> (Arc<AppState>, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = Config {
            server: ServerConfig {
                data_dir: dir.path().to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        };
        (Arc::new(AppState::new(config).unwrap()), dir)
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn successful_login_publishes_exactly_one_success() {
        let (state, _dir) = test_state();
        let response = login(
            State(state.clone()),
            Json(login_request("student@example.com", "password123")),
        )
        .await
        .unwrap();
        assert!(response.0.is_authenticated);

        let recent = state.notifier.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn failed_login_publishes_exactly_one_error() {
        let (state, _dir) = test_state();
        let err = login(
            State(state.clone()),
            Json(login_request("student@example.com", "wrong")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);

        let recent = state.notifier.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn signup_validation_failure_publishes_exactly_one_error() {
        let (state, _dir) = test_state();
        let err = signup(
            State(state.clone()),
            Json(SignUpRequest {
                name: "".to_string(),
                email: "not-an-email".to_string(),
                password: "pw".to_string(),
                role: UserRole::Student,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let recent = state.notifier.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn logout_publishes_exactly_one_success() {
        let (state, _dir) = test_state();
        let status = logout(State(state.clone())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let recent = state.notifier.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn session_lookup_publishes_nothing() {
        let (state, _dir) = test_state();
        let response = session(State(state.clone())).await;
        assert!(!response.0.is_authenticated);
        assert!(state.notifier.recent().is_empty());
    }

    #[tokio::test]
    async fn social_sign_in_publishes_exactly_one_error() {
        let (state, _dir) = test_state();
        let err = social_sign_in(State(state.clone()), Path(SocialProvider::Google))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotImplemented);

        let recent = state.notifier.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, NotificationKind::Error);
    }
}
