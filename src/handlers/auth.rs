use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use sea_orm::*;
use tera::Context;
use tower_sessions::Session;
use tracing::instrument;

use crate::entity::{profile, user};
use crate::error::AppError;
use crate::extractors::auth::{AuthUser, MaybeUser, SESSION_USER_ID, SESSION_USERNAME};
use crate::extractors::form::AppForm;
use crate::models::auth::{
    ChangePasswordForm, LoginForm, RegisterForm, validate_password_pair, validate_register_form,
};
use crate::state::AppState;
use crate::utils::{flash, hash};

use super::{check, render};

/// Show the registration form.
#[instrument(skip_all)]
pub async fn register_page(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    if user.is_some() {
        flash::push(&session, flash::Level::Warning, "You are already logged in!").await;
        return Ok(Redirect::to("/").into_response());
    }

    let context = Context::new();
    Ok(render(&state, &session, "register.html", context)
        .await?
        .into_response())
}

/// Handle registration: create the user and its profile in one transaction,
/// then log the new account in.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn register(
    MaybeUser(current): MaybeUser,
    State(state): State<AppState>,
    session: Session,
    AppForm(form): AppForm<RegisterForm>,
) -> Result<Response, AppError> {
    if current.is_some() {
        flash::push(&session, flash::Level::Warning, "You are already logged in!").await;
        return Ok(Redirect::to("/").into_response());
    }

    if let Some(resp) = check(
        validate_register_form(&form),
        &session,
        "/accounts/register/",
    )
    .await?
    {
        return Ok(resp);
    }

    let username = form.username.trim().to_string();

    let password_hash = hash::hash_password(&form.password1)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let txn = state.db.begin().await?;

    let new_user = user::ActiveModel {
        username: Set(username.clone()),
        password: Set(password_hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = match new_user.insert(&txn).await {
        Ok(model) => model,
        Err(e) => {
            if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
                flash::push(&session, flash::Level::Error, "Username is already taken").await;
                return Ok(Redirect::to("/accounts/register/").into_response());
            }
            return Err(e.into());
        }
    };

    // The profile is created here, explicitly, so the two rows always appear
    // together or not at all.
    let new_profile = profile::ActiveModel {
        user_id: Set(created.id),
        name: Set(created.username.clone()),
        age: Set(0),
        image: Set(None),
        bio: Set(String::new()),
        ..Default::default()
    };
    new_profile.insert(&txn).await?;

    txn.commit().await?;

    establish_session(&session, created.id, &created.username).await?;
    flash::push(&session, flash::Level::Success, "Registered successfully").await;

    Ok(Redirect::to("/").into_response())
}

/// Show the login form.
#[instrument(skip_all)]
pub async fn login_page(
    MaybeUser(user): MaybeUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    if user.is_some() {
        flash::push(&session, flash::Level::Warning, "You are already logged in!").await;
        return Ok(Redirect::to("/").into_response());
    }

    let context = Context::new();
    Ok(render(&state, &session, "login.html", context)
        .await?
        .into_response())
}

/// Handle login. Wrong credentials never establish a session.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    MaybeUser(current): MaybeUser,
    State(state): State<AppState>,
    session: Session,
    AppForm(form): AppForm<LoginForm>,
) -> Result<Response, AppError> {
    if current.is_some() {
        flash::push(&session, flash::Level::Warning, "You are already logged in!").await;
        return Ok(Redirect::to("/").into_response());
    }

    let username = form.username.trim();

    let found = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await?;

    let Some(account) = found else {
        flash::push(
            &session,
            flash::Level::Error,
            "Username or password is wrong",
        )
        .await;
        return Ok(Redirect::to("/accounts/login/").into_response());
    };

    let is_valid = hash::verify_password(&form.password, &account.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        flash::push(
            &session,
            flash::Level::Error,
            "Username or password is wrong",
        )
        .await;
        return Ok(Redirect::to("/accounts/login/").into_response());
    }

    establish_session(&session, account.id, &account.username).await?;
    flash::push(&session, flash::Level::Success, "Logged in successfully").await;

    Ok(Redirect::to("/").into_response())
}

/// Clear the session and go home.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Response, AppError> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("Session flush error: {e}")))?;
    flash::push(&session, flash::Level::Success, "Logged out successfully").await;

    Ok(Redirect::to("/").into_response())
}

/// Show the password-change form.
#[instrument(skip_all)]
pub async fn update_password_page(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let mut context = Context::new();
    context.insert("user", &user);
    Ok(render(&state, &session, "update_password.html", context)
        .await?
        .into_response())
}

/// Handle a password change. The session is re-established on success.
#[instrument(skip(state, session, form), fields(user_id = user.user_id))]
pub async fn update_password(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    AppForm(form): AppForm<ChangePasswordForm>,
) -> Result<Response, AppError> {
    let account = user::Entity::find_by_id(user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".into()))?;

    let old_ok = hash::verify_password(&form.old_password, &account.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !old_ok {
        flash::push(&session, flash::Level::Error, "Old password is wrong").await;
        return Ok(Redirect::to("/accounts/update_password/").into_response());
    }

    if let Some(resp) = check(
        validate_password_pair(&form.new_password1, &form.new_password2),
        &session,
        "/accounts/update_password/",
    )
    .await?
    {
        return Ok(resp);
    }

    let new_hash = hash::hash_password(&form.new_password1)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let user_id = account.id;
    let username = account.username.clone();
    let mut active: user::ActiveModel = account.into();
    active.password = Set(new_hash);
    active.update(&state.db).await?;

    establish_session(&session, user_id, &username).await?;
    flash::push(
        &session,
        flash::Level::Success,
        "Your password has been updated",
    )
    .await;

    Ok(Redirect::to("/").into_response())
}

/// Store the login in the session under a fresh session id.
async fn establish_session(
    session: &Session,
    user_id: i32,
    username: &str,
) -> Result<(), AppError> {
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("Session cycle error: {e}")))?;
    session
        .insert(SESSION_USER_ID, user_id)
        .await
        .map_err(|e| AppError::Internal(format!("Session write error: {e}")))?;
    session
        .insert(SESSION_USERNAME, username)
        .await
        .map_err(|e| AppError::Internal(format!("Session write error: {e}")))?;
    Ok(())
}
