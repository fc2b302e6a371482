use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::{
    Course, CourseProgress, CourseUpdate, EnrollOutcome, NewCourse, User,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::notify_failure;
use super::validation::{validate_course_title, validate_required};

#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    pub already_enrolled: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub progress: u8,
}

pub async fn list_courses(State(state): State<Arc<AppState>>) -> Json<Vec<Course>> {
    Json(state.catalog.courses())
}

/// The catalog as seen by the current principal: enrolled courses for a
/// student, owned courses for a teacher, everything for a manager.
pub async fn my_courses(State(state): State<Arc<AppState>>) -> Json<Vec<Course>> {
    Json(state.catalog.user_courses())
}

pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Course>, ApiError> {
    state
        .catalog
        .get_course(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Course not found"))
}

pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_course_title(&req.title) {
        errors.add("title", e);
    }
    if let Err(e) = validate_required(&req.description, "Description") {
        errors.add("description", e);
    }
    if let Err(api) = errors.finish() {
        return Err(notify_failure(&state, api));
    }

    match state.catalog.add_course(req).await {
        Ok(course) => {
            state.notifier.success("Course added successfully");
            Ok((StatusCode::CREATED, Json(course)))
        }
        Err(e) => Err(notify_failure(&state, e.into())),
    }
}

pub async fn update_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CourseUpdate>,
) -> Result<Json<Course>, ApiError> {
    if let Some(title) = req.title.as_deref() {
        if let Err(e) = validate_course_title(title) {
            let mut errors = ValidationErrorBuilder::new();
            errors.add("title", e);
            return Err(notify_failure(&state, errors.finish().unwrap_err()));
        }
    }

    match state.catalog.update_course(&id, req).await {
        Ok(course) => {
            state.notifier.success("Course updated successfully");
            Ok(Json(course))
        }
        Err(e) => Err(notify_failure(&state, e.into())),
    }
}

pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.catalog.delete_course(&id).await {
        Ok(()) => {
            state.notifier.success("Course deleted successfully");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => Err(notify_failure(&state, e.into())),
    }
}

pub async fn enroll(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EnrollResponse>, ApiError> {
    match state.catalog.enroll_in_course(&id).await {
        Ok(EnrollOutcome::Enrolled) => {
            state.notifier.success("Enrolled in course successfully");
            Ok(Json(EnrollResponse {
                already_enrolled: false,
            }))
        }
        Ok(EnrollOutcome::AlreadyEnrolled) => {
            state.notifier.info("You are already enrolled in this course");
            Ok(Json(EnrollResponse {
                already_enrolled: true,
            }))
        }
        Err(e) => Err(notify_failure(&state, e.into())),
    }
}

pub async fn update_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<CourseProgress>, ApiError> {
    match state.catalog.update_progress(&id, req.progress).await {
        Ok(record) => {
            state.notifier.success("Progress updated");
            Ok(Json(record))
        }
        Err(e) => Err(notify_failure(&state, e.into())),
    }
}

pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path((course_id, user_id)): Path<(String, String)>,
) -> Result<Json<CourseProgress>, ApiError> {
    state
        .catalog
        .get_course_progress(&course_id, &user_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Progress record not found"))
}

pub async fn students(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<Vec<User>> {
    Json(state.catalog.get_students_for_course(&id))
}
