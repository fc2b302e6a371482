//! Fixture data seeded into the stores at startup.
//!
//! This stands in for a real backend: three well-known accounts (one per
//! role), a small catalog owned by the teacher account, and the rosters and
//! progress records that go with it.

use chrono::{DateTime, Utc};

use super::models::{Course, CourseProgress, Enrollment, User, UserRole};

/// The shared password for every fixture account.
pub const FIXTURE_PASSWORD: &str = "password123";

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid fixture timestamp")
}

fn avatar(name: &str, background: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background={}&color=fff",
        name.replace(' ', "+"),
        background
    )
}

/// Built-in accounts. All use [`FIXTURE_PASSWORD`]; hashing happens when the
/// identity store loads them.
pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: "1".to_string(),
            name: "Student User".to_string(),
            email: "student@example.com".to_string(),
            role: UserRole::Student,
            profile_image: Some(avatar("Student User", "6366f1")),
        },
        User {
            id: "2".to_string(),
            name: "Teacher User".to_string(),
            email: "teacher@example.com".to_string(),
            role: UserRole::Teacher,
            profile_image: Some(avatar("Teacher User", "8b5cf6")),
        },
        User {
            id: "3".to_string(),
            name: "Manager User".to_string(),
            email: "manager@example.com".to_string(),
            role: UserRole::Manager,
            profile_image: Some(avatar("Manager User", "ec4899")),
        },
    ]
}

pub fn seed_courses() -> Vec<Course> {
    vec![
        Course {
            id: "course1".to_string(),
            title: "Introduction to React".to_string(),
            description: "Learn the fundamentals of React including components, state, and hooks."
                .to_string(),
            cover_image: "https://images.unsplash.com/photo-1633356122544-f134324a6cee?w=1470"
                .to_string(),
            teacher_id: "2".to_string(),
            created_at: ts("2023-01-01T00:00:00Z"),
            updated_at: ts("2023-01-01T00:00:00Z"),
        },
        Course {
            id: "course2".to_string(),
            title: "Advanced JavaScript Patterns".to_string(),
            description:
                "Dive deep into JavaScript patterns like closures, prototypes, and async programming."
                    .to_string(),
            cover_image: "https://images.unsplash.com/photo-1627398242454-45a1465c2479?w=1374"
                .to_string(),
            teacher_id: "2".to_string(),
            created_at: ts("2023-02-01T00:00:00Z"),
            updated_at: ts("2023-02-10T00:00:00Z"),
        },
        Course {
            id: "course3".to_string(),
            title: "UI/UX Design Principles".to_string(),
            description: "Master the principles of effective user interface and experience design."
                .to_string(),
            cover_image: "https://images.unsplash.com/photo-1587440871875-191322ee64b0?w=1471"
                .to_string(),
            teacher_id: "2".to_string(),
            created_at: ts("2023-03-01T00:00:00Z"),
            updated_at: ts("2023-03-15T00:00:00Z"),
        },
    ]
}

/// One roster per seeded course.
pub fn seed_enrollments() -> Vec<Enrollment> {
    vec![
        Enrollment {
            course_id: "course1".to_string(),
            student_ids: vec!["1".to_string()],
        },
        Enrollment {
            course_id: "course2".to_string(),
            student_ids: vec!["1".to_string()],
        },
        Enrollment {
            course_id: "course3".to_string(),
            student_ids: vec![],
        },
    ]
}

pub fn seed_progress() -> Vec<CourseProgress> {
    vec![
        CourseProgress {
            user_id: "1".to_string(),
            course_id: "course1".to_string(),
            progress: 75,
            last_accessed: ts("2023-04-10T14:30:00Z"),
        },
        CourseProgress {
            user_id: "1".to_string(),
            course_id: "course2".to_string(),
            progress: 30,
            last_accessed: ts("2023-04-12T16:45:00Z"),
        },
        CourseProgress {
            user_id: "2".to_string(),
            course_id: "course1".to_string(),
            progress: 100,
            last_accessed: ts("2023-04-05T10:15:00Z"),
        },
    ]
}
