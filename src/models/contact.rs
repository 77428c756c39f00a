use serde::Deserialize;

use crate::error::AppError;

/// Contact form fields.
#[derive(Deserialize)]
pub struct ContactForm {
    pub subject: String,
    pub message: String,
}

pub fn validate_contact_form(form: &ContactForm) -> Result<(), AppError> {
    let subject = form.subject.trim();
    if subject.is_empty() || subject.chars().count() > 500 {
        return Err(AppError::Validation(
            "Subject must be 1-500 characters".into(),
        ));
    }
    if form.message.trim().is_empty() {
        return Err(AppError::Validation("Message must not be empty".into()));
    }
    Ok(())
}
