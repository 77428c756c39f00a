use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::utils::flash;

/// Session key holding the logged-in user's id.
pub const SESSION_USER_ID: &str = "user_id";

/// Session key holding the logged-in user's username.
pub const SESSION_USERNAME: &str = "username";

/// Authenticated user read from the session.
///
/// Add this as a handler parameter to require a login; anonymous requests are
/// flashed a notice and redirected to the login form.
#[derive(Debug, Serialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(format!("Session unavailable: {msg}")))?;

        let user_id: Option<i32> = session
            .get(SESSION_USER_ID)
            .await
            .map_err(|e| AppError::Internal(format!("Session read error: {e}")))?;

        match user_id {
            Some(user_id) => {
                let username: String = session
                    .get(SESSION_USERNAME)
                    .await
                    .map_err(|e| AppError::Internal(format!("Session read error: {e}")))?
                    .unwrap_or_default();
                Ok(AuthUser { user_id, username })
            }
            None => {
                flash::push(
                    &session,
                    flash::Level::Warning,
                    "You must be logged in to access that page",
                )
                .await;
                Err(AppError::NotAuthenticated)
            }
        }
    }
}

/// Like [`AuthUser`] but never rejects; `None` for anonymous requests.
///
/// Used by the register/login pages to warn users who are already signed in.
#[derive(Debug)]
pub struct MaybeUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(format!("Session unavailable: {msg}")))?;

        let user_id: Option<i32> = session
            .get(SESSION_USER_ID)
            .await
            .map_err(|e| AppError::Internal(format!("Session read error: {e}")))?;

        let Some(user_id) = user_id else {
            return Ok(MaybeUser(None));
        };

        let username: String = session
            .get(SESSION_USERNAME)
            .await
            .map_err(|e| AppError::Internal(format!("Session read error: {e}")))?
            .unwrap_or_default();

        Ok(MaybeUser(Some(AuthUser { user_id, username })))
    }
}
