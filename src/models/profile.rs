use std::collections::HashMap;

use crate::error::AppError;

/// Upper bound on the bio field, matching the profile form's textarea.
const MAX_BIO_LEN: usize = 150;

/// Profile form fields, pulled out of the multipart body.
pub struct ProfileForm {
    pub name: String,
    pub age: String,
    pub bio: String,
}

impl ProfileForm {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let get = |name: &str| fields.get(name).cloned().unwrap_or_default();
        Self {
            name: get("name"),
            age: get("age"),
            bio: get("bio"),
        }
    }
}

/// Validate the form and return the parsed age.
pub fn validate_profile_form(form: &ProfileForm) -> Result<i32, AppError> {
    let name = form.name.trim();
    if name.is_empty() || name.chars().count() > 255 {
        return Err(AppError::Validation("Name must be 1-255 characters".into()));
    }

    let age: i32 = form
        .age
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("Age must be a whole number".into()))?;
    if !(0..=150).contains(&age) {
        return Err(AppError::Validation("Age must be between 0 and 150".into()));
    }

    if form.bio.chars().count() > MAX_BIO_LEN {
        return Err(AppError::Validation(format!(
            "Bio must be at most {MAX_BIO_LEN} characters"
        )));
    }

    Ok(age)
}
