mod auth;
mod courses;
pub mod error;
mod validation;

use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::notifications::Notification;
use crate::AppState;
use error::ApiError;

/// Record the failure notification for a state-changing request. Exactly one
/// notification per attempt, so every failing handler funnels through here.
fn notify_failure(state: &AppState, err: ApiError) -> ApiError {
    state.notifier.error(err.message().to_string());
    err
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/reset-password", post(auth::reset_password))
        .route("/profile", put(auth::update_profile))
        .route("/social/:provider", post(auth::social_sign_in))
        .route("/session", get(auth::session));

    let api_routes = Router::new()
        // Courses
        .route("/courses", get(courses::list_courses))
        .route("/courses", post(courses::create_course))
        .route("/courses/:id", get(courses::get_course))
        .route("/courses/:id", put(courses::update_course))
        .route("/courses/:id", delete(courses::delete_course))
        // Enrollment & progress
        .route("/courses/:id/enroll", post(courses::enroll))
        .route("/courses/:id/students", get(courses::students))
        .route("/courses/:id/progress", put(courses::update_progress))
        .route(
            "/courses/:id/progress/:user_id",
            get(courses::get_progress),
        )
        // Role-filtered view
        .route("/my/courses", get(courses::my_courses))
        // Notification feed
        .route("/notifications", get(recent_notifications));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn recent_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.notifier.recent())
}
