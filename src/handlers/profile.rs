use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Redirect, Response};
use sea_orm::*;
use tera::Context;
use tower_sessions::Session;
use tracing::instrument;

use crate::entity::profile;
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::profile::{ProfileForm, validate_profile_form};
use crate::state::AppState;
use crate::utils::flash;
use crate::utils::upload::{self, AVATAR_DIR};

use super::{check, render};

/// Show the profile form pre-filled with the user's current data.
#[instrument(skip_all)]
pub async fn profile_page(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let own = find_profile(&state.db, user.user_id).await?;

    let mut context = Context::new();
    context.insert("user", &user);
    context.insert("profile", &own);

    Ok(render(&state, &session, "profile.html", context)
        .await?
        .into_response())
}

/// Update the user's own profile fields and optional avatar.
#[instrument(skip(state, session, multipart), fields(user_id = user.user_id))]
pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let own = find_profile(&state.db, user.user_id).await?;

    let (fields, file) = upload::read_form(multipart, "image").await?;
    let form = ProfileForm::from_fields(&fields);

    let age = match validate_profile_form(&form) {
        Ok(age) => age,
        Err(AppError::Validation(msg)) => {
            flash::push(&session, flash::Level::Error, msg).await;
            return Ok(Redirect::to("/accounts/profile/").into_response());
        }
        Err(e) => return Err(e),
    };

    let image = match file {
        Some(file) => {
            if let Some(resp) = check(
                upload::image_extension(&file.filename).map(|_| ()),
                &session,
                "/accounts/profile/",
            )
            .await?
            {
                return Ok(resp);
            }
            Some(upload::save_image(&state.config.media.root, AVATAR_DIR, &file).await?)
        }
        None => None,
    };

    let mut active: profile::ActiveModel = own.into();
    active.name = Set(form.name.trim().to_string());
    active.age = Set(age);
    active.bio = Set(form.bio);
    if let Some(image) = image {
        active.image = Set(Some(image));
    }
    active.update(&state.db).await?;

    flash::push(&session, flash::Level::Success, "Your info has been updated").await;

    Ok(Redirect::to("/").into_response())
}

async fn find_profile<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<profile::Model, AppError> {
    profile::Entity::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))
}
