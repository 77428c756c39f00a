use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use sea_orm::DbErr;

/// Application-level error type.
///
/// Handlers turn expected form-validation failures into flash messages and
/// redirects themselves; what escapes through `?` ends up here and is rendered
/// as a plain error page (or, for unauthenticated access, a redirect to the
/// login form).
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotAuthenticated,
    PermissionDenied,
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".into(),
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                "You don't have permission to do that".into(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".into(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The login redirect carries no flash: the extractor that produced
        // this variant already queued one in the session.
        if matches!(self, AppError::NotAuthenticated) {
            return Redirect::to("/accounts/login/").into_response();
        }

        let (status, message) = self.status_and_message();
        (status, Html(error_page(status, &message))).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

fn error_page(status: StatusCode, message: &str) -> String {
    // Validation messages can echo form input, so escape before inlining.
    let message = message
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<!doctype html><html><head><title>{code} | Sorrel</title></head>\
         <body><main><h1>{code} {reason}</h1><p>{message}</p>\
         <p><a href=\"/\">Back to home</a></p></main></body></html>",
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or(""),
        message = message,
    )
}
