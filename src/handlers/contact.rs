use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use sea_orm::*;
use tera::Context;
use tower_sessions::Session;
use tracing::instrument;

use crate::entity::{contact_info, contact_message};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::extractors::form::AppForm;
use crate::models::contact::{ContactForm, validate_contact_form};
use crate::state::AppState;
use crate::utils::flash;

use super::{check, render};

/// Contact page: the singleton contact-info record plus the message form.
#[instrument(skip_all)]
pub async fn contact_page(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let info = contact_info::Entity::find().one(&state.db).await?;

    let mut context = Context::new();
    context.insert("user", &user);
    context.insert("info", &info);

    Ok(render(&state, &session, "contact.html", context)
        .await?
        .into_response())
}

/// Store a contact message linked to the sender.
#[instrument(skip(state, session, form), fields(user_id = user.user_id))]
pub async fn submit(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    AppForm(form): AppForm<ContactForm>,
) -> Result<Response, AppError> {
    if let Some(resp) = check(validate_contact_form(&form), &session, "/contact/").await? {
        return Ok(resp);
    }

    let new_message = contact_message::ActiveModel {
        subject: Set(form.subject.trim().to_string()),
        message: Set(form.message),
        user_id: Set(user.user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    new_message.insert(&state.db).await?;

    flash::push(
        &session,
        flash::Level::Success,
        "Message is sent successfully",
    )
    .await;

    Ok(Redirect::to("/").into_response())
}
