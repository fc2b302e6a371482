//! The enrollment & catalog store: CRUD over courses, roster management,
//! and per-student progress, all gated by the identity store's current
//! principal at call time.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::info;

use super::identity::IdentityStore;
use super::models::{
    Course, CourseProgress, CourseUpdate, Enrollment, NewCourse, User, UserRole,
};
use super::seeders;
use super::{StoreError, StoreResult};

/// Result of an enrollment attempt. Enrolling twice is not an error; the
/// caller distinguishes the two so it can phrase its notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    Enrolled,
    AlreadyEnrolled,
}

struct CatalogState {
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
    progress: Vec<CourseProgress>,
}

pub struct CourseStore {
    identity: Arc<IdentityStore>,
    inner: RwLock<CatalogState>,
}

impl CourseStore {
    pub fn new(identity: Arc<IdentityStore>) -> Self {
        Self {
            identity,
            inner: RwLock::new(CatalogState {
                courses: seeders::seed_courses(),
                enrollments: seeders::seed_enrollments(),
                progress: seeders::seed_progress(),
            }),
        }
    }

    /// Create a course owned by the calling teacher or manager, together
    /// with its empty roster.
    pub async fn add_course(&self, new: NewCourse) -> StoreResult<Course> {
        let caller = self.require_user()?;
        match caller.role {
            UserRole::Teacher | UserRole::Manager => {}
            UserRole::Student => {
                return Err(StoreError::NotAuthorized(
                    "Only teachers and managers can add courses".to_string(),
                ))
            }
        }

        let now = Utc::now();
        let course = Course {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title,
            description: new.description,
            cover_image: new.cover_image,
            teacher_id: caller.id,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.inner.write();
        state.enrollments.push(Enrollment {
            course_id: course.id.clone(),
            student_ids: Vec::new(),
        });
        state.courses.push(course.clone());
        info!(course_id = %course.id, title = %course.title, "Course created");
        Ok(course)
    }

    /// Merge the given fields into an existing course. Managers may update
    /// any course; a teacher only their own.
    pub async fn update_course(&self, id: &str, update: CourseUpdate) -> StoreResult<Course> {
        let mut state = self.inner.write();
        let index = state
            .courses
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound("Course"))?;

        let caller = self.require_user()?;
        let owned = state.courses[index].teacher_id == caller.id;
        match caller.role {
            UserRole::Manager => {}
            UserRole::Teacher if owned => {}
            UserRole::Teacher | UserRole::Student => {
                return Err(StoreError::NotAuthorized(
                    "You do not have permission to update this course".to_string(),
                ))
            }
        }

        let course = &mut state.courses[index];
        if let Some(title) = update.title {
            course.title = title;
        }
        if let Some(description) = update.description {
            course.description = description;
        }
        if let Some(cover_image) = update.cover_image {
            course.cover_image = cover_image;
        }
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    /// Remove a course along with its roster and every progress record for
    /// it. Managers only; the owning teacher is not exempt.
    pub async fn delete_course(&self, id: &str) -> StoreResult<()> {
        let mut state = self.inner.write();
        if !state.courses.iter().any(|c| c.id == id) {
            return Err(StoreError::NotFound("Course"));
        }

        let caller = self.require_user()?;
        match caller.role {
            UserRole::Manager => {}
            UserRole::Teacher | UserRole::Student => {
                return Err(StoreError::NotAuthorized(
                    "Only managers can delete courses".to_string(),
                ))
            }
        }

        state.courses.retain(|c| c.id != id);
        state.enrollments.retain(|e| e.course_id != id);
        state.progress.retain(|p| p.course_id != id);
        info!(course_id = %id, "Course deleted");
        Ok(())
    }

    /// Add the calling student to a course roster and initialize their
    /// progress record. Enrolling again is a reported-success no-op.
    pub async fn enroll_in_course(&self, course_id: &str) -> StoreResult<EnrollOutcome> {
        let caller = self.require_user()?;
        match caller.role {
            UserRole::Student => {}
            UserRole::Teacher | UserRole::Manager => {
                return Err(StoreError::NotAuthorized(
                    "Only students can enroll in courses".to_string(),
                ))
            }
        }

        let mut state = self.inner.write();
        let enrollment = state
            .enrollments
            .iter_mut()
            .find(|e| e.course_id == course_id)
            .ok_or(StoreError::NotFound("Course"))?;

        if enrollment.student_ids.iter().any(|id| id == &caller.id) {
            return Ok(EnrollOutcome::AlreadyEnrolled);
        }

        enrollment.student_ids.push(caller.id.clone());
        state.progress.push(CourseProgress {
            user_id: caller.id.clone(),
            course_id: course_id.to_string(),
            progress: 0,
            last_accessed: Utc::now(),
        });
        info!(course_id = %course_id, student_id = %caller.id, "Student enrolled");
        Ok(EnrollOutcome::Enrolled)
    }

    /// Record the calling student's completion percentage for a course,
    /// creating the record on first write. The value is clamped to a valid
    /// percentage but deliberately not required to be monotonic.
    pub async fn update_progress(
        &self,
        course_id: &str,
        progress: u8,
    ) -> StoreResult<CourseProgress> {
        let caller = self.require_user()?;
        match caller.role {
            UserRole::Student => {}
            UserRole::Teacher | UserRole::Manager => {
                return Err(StoreError::NotAuthorized(
                    "Only students can update course progress".to_string(),
                ))
            }
        }

        if progress > 100 {
            return Err(StoreError::Validation(
                "Progress must be between 0 and 100".to_string(),
            ));
        }

        let now = Utc::now();
        let mut state = self.inner.write();
        let record = match state
            .progress
            .iter()
            .position(|p| p.course_id == course_id && p.user_id == caller.id)
        {
            Some(index) => {
                let existing = &mut state.progress[index];
                existing.progress = progress;
                existing.last_accessed = now;
                existing.clone()
            }
            None => {
                let record = CourseProgress {
                    user_id: caller.id.clone(),
                    course_id: course_id.to_string(),
                    progress,
                    last_accessed: now,
                };
                state.progress.push(record.clone());
                record
            }
        };
        Ok(record)
    }

    pub fn get_course(&self, id: &str) -> Option<Course> {
        self.inner.read().courses.iter().find(|c| c.id == id).cloned()
    }

    pub fn courses(&self) -> Vec<Course> {
        self.inner.read().courses.clone()
    }

    /// The directory entries for a course's roster, in enrollment order.
    /// Unknown courses yield an empty list.
    pub fn get_students_for_course(&self, course_id: &str) -> Vec<User> {
        let roster = {
            let state = self.inner.read();
            state
                .enrollments
                .iter()
                .find(|e| e.course_id == course_id)
                .map(|e| e.student_ids.clone())
                .unwrap_or_default()
        };
        self.identity.users_by_ids(&roster)
    }

    pub fn get_course_progress(&self, course_id: &str, user_id: &str) -> Option<CourseProgress> {
        self.inner
            .read()
            .progress
            .iter()
            .find(|p| p.course_id == course_id && p.user_id == user_id)
            .cloned()
    }

    /// Courses visible to the current principal: a student sees the courses
    /// they are enrolled in, a teacher the ones they own, a manager all of
    /// them. Recomputed from current state on every call.
    pub fn user_courses(&self) -> Vec<Course> {
        let Some(user) = self.identity.current_user() else {
            return Vec::new();
        };

        let state = self.inner.read();
        match user.role {
            UserRole::Student => state
                .courses
                .iter()
                .filter(|c| {
                    state
                        .enrollments
                        .iter()
                        .find(|e| e.course_id == c.id)
                        .is_some_and(|e| e.student_ids.iter().any(|id| id == &user.id))
                })
                .cloned()
                .collect(),
            UserRole::Teacher => state
                .courses
                .iter()
                .filter(|c| c.teacher_id == user.id)
                .cloned()
                .collect(),
            UserRole::Manager => state.courses.clone(),
        }
    }

    fn require_user(&self) -> StoreResult<User> {
        self.identity
            .current_user()
            .ok_or(StoreError::NotAuthenticated)
    }
}
