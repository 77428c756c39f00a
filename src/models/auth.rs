use serde::Deserialize;

use crate::error::AppError;

/// Registration form fields.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

/// Login form fields.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Password-change form fields.
#[derive(Deserialize)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

pub fn validate_register_form(form: &RegisterForm) -> Result<(), AppError> {
    validate_username(&form.username)?;
    validate_password_pair(&form.password1, &form.password2)
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    Ok(())
}

/// Both password fields must match and satisfy the length rule.
pub fn validate_password_pair(password1: &str, password2: &str) -> Result<(), AppError> {
    if password1 != password2 {
        return Err(AppError::Validation("Passwords do not match".into()));
    }
    if password1.len() < 8 || password1.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}
