use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use sea_orm::*;
use tower_sessions::Session;
use tracing::instrument;

use crate::entity::{blog, comment};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::extractors::form::AppForm;
use crate::models::blog::{CommentForm, DeleteCommentForm};
use crate::state::AppState;
use crate::utils::flash;

/// Add a comment to a post and return to it.
#[instrument(skip(state, session, form), fields(blog = form.blog, user_id = user.user_id))]
pub async fn add(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    AppForm(form): AppForm<CommentForm>,
) -> Result<Response, AppError> {
    let post = blog::Entity::find_by_id(form.blog)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let back = format!("/post/{}", post.id);

    if form.content.trim().is_empty() {
        flash::push(&session, flash::Level::Error, "Comment must not be empty").await;
        return Ok(Redirect::to(&back).into_response());
    }

    let new_comment = comment::ActiveModel {
        body: Set(form.content),
        active: Set(true),
        user_id: Set(Some(user.user_id)),
        blog_id: Set(post.id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    new_comment.insert(&state.db).await?;

    Ok(Redirect::to(&back).into_response())
}

/// Delete a comment and return to its post.
///
/// Allowed for the comment's author and for the author of the post it sits
/// under (who moderates their own page).
#[instrument(skip(state, session, form), fields(comment_pk = form.comment_pk, user_id = user.user_id))]
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    AppForm(form): AppForm<DeleteCommentForm>,
) -> Result<Response, AppError> {
    let target = comment::Entity::find_by_id(form.comment_pk)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;

    let post = blog::Entity::find_by_id(target.blog_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let back = format!("/post/{}", post.id);

    let is_commenter = target.user_id == Some(user.user_id);
    let is_post_author = post.author_id == user.user_id;
    if !is_commenter && !is_post_author {
        flash::push(
            &session,
            flash::Level::Error,
            "You can't delete someone else's comment",
        )
        .await;
        return Ok(Redirect::to(&back).into_response());
    }

    comment::Entity::delete_by_id(target.id)
        .exec(&state.db)
        .await?;

    Ok(Redirect::to(&back).into_response())
}
