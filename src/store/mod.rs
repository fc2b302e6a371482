pub mod catalog;
pub mod identity;
mod models;
mod seeders;

pub use catalog::{CourseStore, EnrollOutcome};
pub use identity::IdentityStore;
pub use models::*;

use thiserror::Error;

/// Failure taxonomy shared by both stores. Every operation reports its own
/// failure as a typed variant; notifying the user is the caller's concern.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("You must be signed in to perform this action")]
    NotAuthenticated,

    #[error("{0}")]
    NotAuthorized(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Email already in use")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
