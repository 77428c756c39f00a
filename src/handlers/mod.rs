pub mod auth;
pub mod blog;
pub mod comment;
pub mod contact;
pub mod profile;

use axum::response::{Html, IntoResponse, Redirect, Response};
use tera::Context;
use tower_sessions::Session;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::flash;

/// Render a template with the queued flash messages drained into it.
pub(crate) async fn render(
    state: &AppState,
    session: &Session,
    template: &str,
    mut context: Context,
) -> Result<Html<String>, AppError> {
    let messages = flash::take(session).await;
    context.insert("messages", &messages);

    let html = state
        .templates
        .render(template, &context)
        .map_err(|e| AppError::Internal(format!("Template '{template}' error: {e}")))?;

    Ok(Html(html))
}

/// Turn a validation failure into a flash + redirect to `back`; other errors
/// pass through to the error page.
pub(crate) async fn check(
    result: Result<(), AppError>,
    session: &Session,
    back: &str,
) -> Result<Option<Response>, AppError> {
    match result {
        Ok(()) => Ok(None),
        Err(AppError::Validation(msg)) => {
            flash::push(session, flash::Level::Error, msg).await;
            Ok(Some(Redirect::to(back).into_response()))
        }
        Err(e) => Err(e),
    }
}
