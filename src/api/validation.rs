//! Input validation for API requests.
//!
//! Presence checks only; anything richer belongs to a real backend. Each
//! function returns a human-readable message on failure so handlers can
//! collect them per field.

const MAX_TITLE_LENGTH: usize = 200;

pub fn validate_required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    validate_required(email, "Email")?;
    if !email.contains('@') {
        return Err("Invalid email address".to_string());
    }
    Ok(())
}

pub fn validate_course_title(title: &str) -> Result<(), String> {
    validate_required(title, "Title")?;
    if title.len() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        ));
    }
    Ok(())
}
