use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, OnConflict};
use sea_orm::*;
use tera::Context;
use tower_sessions::Session;
use tracing::instrument;

use crate::entity::{blog, blog_tag, comment, tag, user};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::blog::{
    BlogForm, CommentView, HomeQuery, PostListItem, RelatedPost, TagView, escape_like,
    parse_tags, validate_blog_form,
};
use crate::models::shared::Pagination;
use crate::state::AppState;
use crate::utils::flash;
use crate::utils::upload::{self, BLOG_IMAGE_DIR};

use super::{check, render};

/// Posts shown per listing page.
const PAGE_SIZE: u64 = 2;

/// Home listing with optional substring search, newest first.
#[instrument(skip(state, session, user, query))]
pub async fn home(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<HomeQuery>,
) -> Result<Response, AppError> {
    let mut select = blog::Entity::find();

    let search = query.search.as_deref().map(str::trim).unwrap_or_default();
    if !search.is_empty() {
        let pattern = format!("%{}%", escape_like(search).to_lowercase());
        select = select.filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(blog::Column::Title)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(blog::Column::Content)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    let total = select
        .clone()
        .paginate(&state.db, PAGE_SIZE)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(PAGE_SIZE);

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let page = if total_pages > 0 {
        Ord::min(page, total_pages)
    } else {
        1
    };

    let blogs = select
        .order_by_desc(blog::Column::CreatedAt)
        .order_by_desc(blog::Column::Id)
        .offset(Some((page - 1) * PAGE_SIZE))
        .limit(Some(PAGE_SIZE))
        .all(&state.db)
        .await?;

    let items = to_list_items(&state.db, blogs).await?;

    let mut context = Context::new();
    context.insert("user", &user);
    context.insert("blogs", &items);
    context.insert(
        "pagination",
        &Pagination {
            page,
            per_page: PAGE_SIZE,
            total,
            total_pages,
        },
    );
    if !search.is_empty() {
        context.insert("search", search);
    }

    Ok(render(&state, &session, "index.html", context)
        .await?
        .into_response())
}

/// Post detail: the post, its active comments, and tag-related posts.
#[instrument(skip(state, session, user), fields(id))]
pub async fn post_detail(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let post = find_blog(&state.db, id).await?;
    render_post(&state, &session, &user, post).await
}

/// Detail page for the most recent post.
#[instrument(skip_all)]
pub async fn last_post(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let post = blog::Entity::find()
        .order_by_desc(blog::Column::CreatedAt)
        .order_by_desc(blog::Column::Id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No posts yet".into()))?;

    render_post(&state, &session, &user, post).await
}

/// All posts carrying a tag, resolved by slug.
#[instrument(skip(state, session, user), fields(slug = %slug))]
pub async fn posts_by_tag(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let tag = tag::Entity::find()
        .filter(tag::Column::Slug.eq(&slug))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".into()))?;

    let blog_ids: Vec<i32> = blog_tag::Entity::find()
        .filter(blog_tag::Column::TagId.eq(tag.id))
        .select_only()
        .column(blog_tag::Column::BlogId)
        .into_tuple::<i32>()
        .all(&state.db)
        .await?;

    let blogs = blog::Entity::find()
        .filter(blog::Column::Id.is_in(blog_ids))
        .order_by_desc(blog::Column::CreatedAt)
        .order_by_desc(blog::Column::Id)
        .all(&state.db)
        .await?;

    let items = to_list_items(&state.db, blogs).await?;

    let mut context = Context::new();
    context.insert("user", &user);
    context.insert("blogs", &items);
    context.insert("active_tag", &tag.name);

    Ok(render(&state, &session, "index.html", context)
        .await?
        .into_response())
}

/// Show the post creation form.
#[instrument(skip_all)]
pub async fn create_page(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let mut context = Context::new();
    context.insert("user", &user);
    Ok(render(&state, &session, "create_blog.html", context)
        .await?
        .into_response())
}

/// Create a post from the multipart form (cover image required).
#[instrument(skip(state, session, multipart), fields(user_id = user.user_id))]
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (fields, file) = upload::read_form(multipart, "image").await?;
    let form = BlogForm::from_fields(&fields);

    if let Some(resp) = check(validate_blog_form(&form), &session, "/create_blog/").await? {
        return Ok(resp);
    }

    let Some(file) = file else {
        flash::push(&session, flash::Level::Error, "An image is required").await;
        return Ok(Redirect::to("/create_blog/").into_response());
    };
    if let Some(resp) = check(
        upload::image_extension(&file.filename).map(|_| ()),
        &session,
        "/create_blog/",
    )
    .await?
    {
        return Ok(resp);
    }

    let image = upload::save_image(&state.config.media.root, BLOG_IMAGE_DIR, &file).await?;

    let txn = state.db.begin().await?;

    let new_blog = blog::ActiveModel {
        title: Set(form.title.trim().to_string()),
        content: Set(form.content),
        image: Set(image),
        author_id: Set(user.user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = new_blog.insert(&txn).await?;

    apply_tags(&txn, created.id, &parse_tags(&form.tags)).await?;

    txn.commit().await?;

    flash::push(
        &session,
        flash::Level::Success,
        "The blog has been created successfully",
    )
    .await;

    Ok(Redirect::to("/").into_response())
}

/// Show the edit form. Author-only.
#[instrument(skip(state, session, user), fields(id))]
pub async fn edit_page(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let post = find_blog(&state.db, id).await?;
    if post.author_id != user.user_id {
        return Ok(reject_non_author(&session).await);
    }

    let tags = tags_of(&state.db, post.id).await?;
    let tags_value = tags
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut context = Context::new();
    context.insert("user", &user);
    context.insert("post", &post);
    context.insert("tags_value", &tags_value);

    Ok(render(&state, &session, "edit_blog.html", context)
        .await?
        .into_response())
}

/// Apply an edit. Author-only; the tag set is replaced from the form field.
#[instrument(skip(state, session, multipart), fields(id, user_id = user.user_id))]
pub async fn edit(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let post = find_blog(&state.db, id).await?;
    if post.author_id != user.user_id {
        return Ok(reject_non_author(&session).await);
    }

    let (fields, file) = upload::read_form(multipart, "image").await?;
    let form = BlogForm::from_fields(&fields);

    let back = format!("/edit_post/{id}");
    if let Some(resp) = check(validate_blog_form(&form), &session, &back).await? {
        return Ok(resp);
    }

    // A new cover image is optional on edit; the old file stays if none is
    // uploaded.
    let image = match file {
        Some(file) => {
            if let Some(resp) = check(
                upload::image_extension(&file.filename).map(|_| ()),
                &session,
                &back,
            )
            .await?
            {
                return Ok(resp);
            }
            Some(upload::save_image(&state.config.media.root, BLOG_IMAGE_DIR, &file).await?)
        }
        None => None,
    };

    let txn = state.db.begin().await?;

    let post_id = post.id;
    let mut active: blog::ActiveModel = post.into();
    active.title = Set(form.title.trim().to_string());
    active.content = Set(form.content);
    if let Some(image) = image {
        active.image = Set(image);
    }
    active.update(&txn).await?;

    apply_tags(&txn, post_id, &parse_tags(&form.tags)).await?;

    txn.commit().await?;

    flash::push(&session, flash::Level::Success, "Post has been updated").await;

    Ok(Redirect::to("/").into_response())
}

/// Delete a post with its comments and tag links. Author-only.
#[instrument(skip(state, session, user), fields(id))]
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let post = find_blog(&state.db, id).await?;
    if post.author_id != user.user_id {
        return Ok(reject_non_author(&session).await);
    }

    let txn = state.db.begin().await?;

    comment::Entity::delete_many()
        .filter(comment::Column::BlogId.eq(post.id))
        .exec(&txn)
        .await?;
    blog_tag::Entity::delete_many()
        .filter(blog_tag::Column::BlogId.eq(post.id))
        .exec(&txn)
        .await?;
    blog::Entity::delete_by_id(post.id).exec(&txn).await?;

    txn.commit().await?;

    Ok(Redirect::to("/").into_response())
}

/// Flash the access error and go home.
async fn reject_non_author(session: &Session) -> Response {
    flash::push(session, flash::Level::Error, "You can't access this page").await;
    Redirect::to("/").into_response()
}

async fn find_blog<C: ConnectionTrait>(db: &C, id: i32) -> Result<blog::Model, AppError> {
    blog::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

/// Render the detail page for a post.
async fn render_post(
    state: &AppState,
    session: &Session,
    user: &AuthUser,
    post: blog::Model,
) -> Result<Response, AppError> {
    let author = user::Entity::find_by_id(post.author_id)
        .one(&state.db)
        .await?
        .map(|u| u.username)
        .unwrap_or_default();

    let comments = comment::Entity::find()
        .filter(comment::Column::BlogId.eq(post.id))
        .filter(comment::Column::Active.eq(true))
        .order_by_desc(comment::Column::Id)
        .all(&state.db)
        .await?;

    let commenter_ids: Vec<i32> = comments.iter().filter_map(|c| c.user_id).collect();
    let commenters: HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(commenter_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let comment_views: Vec<CommentView> = comments
        .into_iter()
        .map(|c| CommentView {
            id: c.id,
            body: c.body,
            author: c.user_id.and_then(|id| commenters.get(&id).cloned()),
            created_at: c.created_at,
        })
        .collect();

    let tags = tags_of(&state.db, post.id).await?;
    let tag_views: Vec<TagView> = tags
        .iter()
        .map(|t| TagView {
            name: t.name.clone(),
            slug: t.slug.clone(),
        })
        .collect();

    let related = related_posts(&state.db, post.id, &tags).await?;

    let mut context = Context::new();
    context.insert("user", user);
    context.insert("post", &post);
    context.insert("author", &author);
    context.insert("comments", &comment_views);
    context.insert("tags", &tag_views);
    context.insert("related_posts", &related);

    Ok(render(state, session, "post.html", context)
        .await?
        .into_response())
}

/// Other posts sharing at least one of `tags`, deduplicated, newest first.
async fn related_posts<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
    tags: &[tag::Model],
) -> Result<Vec<RelatedPost>, AppError> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let tag_ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
    let related_ids: Vec<i32> = blog_tag::Entity::find()
        .filter(blog_tag::Column::TagId.is_in(tag_ids))
        .filter(blog_tag::Column::BlogId.ne(post_id))
        .select_only()
        .column(blog_tag::Column::BlogId)
        .distinct()
        .into_tuple::<i32>()
        .all(db)
        .await?;

    let related = blog::Entity::find()
        .filter(blog::Column::Id.is_in(related_ids))
        .order_by_desc(blog::Column::CreatedAt)
        .order_by_desc(blog::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|b| RelatedPost {
            id: b.id,
            title: b.title,
            image: b.image,
            created_at: b.created_at,
        })
        .collect();

    Ok(related)
}

/// Tags attached to a post.
async fn tags_of<C: ConnectionTrait>(db: &C, blog_id: i32) -> Result<Vec<tag::Model>, AppError> {
    let tag_ids: Vec<i32> = blog_tag::Entity::find()
        .filter(blog_tag::Column::BlogId.eq(blog_id))
        .select_only()
        .column(blog_tag::Column::TagId)
        .into_tuple::<i32>()
        .all(db)
        .await?;

    let tags = tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids))
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?;

    Ok(tags)
}

/// Replace a post's tag set with `names`, find-or-creating each tag.
async fn apply_tags<C: ConnectionTrait>(
    db: &C,
    blog_id: i32,
    names: &[String],
) -> Result<(), AppError> {
    blog_tag::Entity::delete_many()
        .filter(blog_tag::Column::BlogId.eq(blog_id))
        .exec(db)
        .await?;

    for name in names {
        let slug = crate::utils::slug::slugify(name);
        if slug.is_empty() {
            continue;
        }

        let existing = tag::Entity::find()
            .filter(tag::Column::Slug.eq(&slug))
            .one(db)
            .await?;

        let tag_id = match existing {
            Some(tag) => tag.id,
            None => {
                let new_tag = tag::ActiveModel {
                    name: Set(name.clone()),
                    slug: Set(slug),
                    ..Default::default()
                };
                new_tag.insert(db).await?.id
            }
        };

        let link = blog_tag::ActiveModel {
            blog_id: Set(blog_id),
            tag_id: Set(tag_id),
            ..Default::default()
        };
        blog_tag::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([blog_tag::Column::BlogId, blog_tag::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await
            .map(|_| ())
            .or_else(|e| match e {
                DbErr::RecordNotInserted => Ok(()),
                other => Err(other),
            })?;
    }

    Ok(())
}

/// Decorate a page of posts with author names and comment counts.
async fn to_list_items<C: ConnectionTrait>(
    db: &C,
    blogs: Vec<blog::Model>,
) -> Result<Vec<PostListItem>, AppError> {
    if blogs.is_empty() {
        return Ok(Vec::new());
    }

    let author_ids: Vec<i32> = blogs.iter().map(|b| b.author_id).collect();
    let authors: HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let blog_ids: Vec<i32> = blogs.iter().map(|b| b.id).collect();
    let counts: HashMap<i32, i64> = comment::Entity::find()
        .filter(comment::Column::BlogId.is_in(blog_ids))
        .select_only()
        .column(comment::Column::BlogId)
        .column_as(comment::Column::Id.count(), "count")
        .group_by(comment::Column::BlogId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let items = blogs
        .into_iter()
        .map(|b| PostListItem {
            id: b.id,
            title: b.title,
            content: b.content,
            image: b.image,
            author: authors.get(&b.author_id).cloned().unwrap_or_default(),
            comment_count: counts.get(&b.id).copied().unwrap_or(0),
            created_at: b.created_at,
        })
        .collect();

    Ok(items)
}
