use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use super::shared::{Pagination, escape_like};
use super::shared::validate_title;

/// Maximum length of a single tag name.
const MAX_TAG_LEN: usize = 50;

/// Post form fields, pulled out of the multipart body.
pub struct BlogForm {
    pub title: String,
    pub content: String,
    /// Raw comma-separated tag input, parsed with [`parse_tags`].
    pub tags: String,
}

impl BlogForm {
    /// Build the form from multipart text fields; missing fields default to
    /// empty and fail validation with a field-specific message.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let get = |name: &str| fields.get(name).cloned().unwrap_or_default();
        Self {
            title: get("title"),
            content: get("content"),
            tags: get("tags"),
        }
    }
}

pub fn validate_blog_form(form: &BlogForm) -> Result<(), AppError> {
    validate_title(&form.title)?;
    if form.content.trim().is_empty() {
        return Err(AppError::Validation("Content must not be empty".into()));
    }
    for tag in parse_tags(&form.tags) {
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(AppError::Validation(format!(
                "Tag '{tag}' is too long (max {MAX_TAG_LEN} characters)"
            )));
        }
    }
    Ok(())
}

/// Split a comma-separated tag field into trimmed, non-empty, unique names.
///
/// Duplicates are detected case-insensitively; the first spelling wins.
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut seen = Vec::new();
    let mut tags = Vec::new();
    for raw in input.split(',') {
        let name = raw.trim();
        if name.is_empty() {
            continue;
        }
        let lower = name.to_lowercase();
        if seen.contains(&lower) {
            continue;
        }
        seen.push(lower);
        tags.push(name.to_string());
    }
    tags
}

/// Comment form fields (field names match the post-page form inputs).
#[derive(Deserialize)]
pub struct CommentForm {
    /// Id of the blog being commented on.
    pub blog: i32,
    pub content: String,
}

#[derive(Deserialize)]
pub struct DeleteCommentForm {
    #[serde(rename = "comment-pk")]
    pub comment_pk: i32,
}

/// Query parameters accepted by the home listing.
#[derive(Deserialize, Default)]
pub struct HomeQuery {
    pub search: Option<String>,
    pub page: Option<u64>,
}

/// One post on a listing page.
#[derive(Serialize)]
pub struct PostListItem {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub image: String,
    pub author: String,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A tag reference for links.
#[derive(Serialize)]
pub struct TagView {
    pub name: String,
    pub slug: String,
}

/// A post sharing at least one tag with the one being viewed.
#[derive(Serialize)]
pub struct RelatedPost {
    pub id: i32,
    pub title: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

/// An active comment on the post page.
#[derive(Serialize)]
pub struct CommentView {
    pub id: i32,
    pub body: String,
    /// None when the commenting account no longer exists.
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}
