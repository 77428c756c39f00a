use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/accounts", account_routes())
        .merge(blog_routes())
}

fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register/",
            get(handlers::auth::register_page).post(handlers::auth::register),
        )
        .route(
            "/login/",
            get(handlers::auth::login_page).post(handlers::auth::login),
        )
        .route("/logout/", get(handlers::auth::logout))
        .route(
            "/update_password/",
            get(handlers::auth::update_password_page).post(handlers::auth::update_password),
        )
        .route(
            "/profile/",
            get(handlers::profile::profile_page).post(handlers::profile::update_profile),
        )
}

fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::blog::home))
        .route("/post/{id}", get(handlers::blog::post_detail))
        .route("/tags/{slug}", get(handlers::blog::posts_by_tag))
        .route("/last_post/", get(handlers::blog::last_post))
        .route(
            "/create_blog/",
            get(handlers::blog::create_page).post(handlers::blog::create),
        )
        .route(
            "/edit_post/{id}",
            get(handlers::blog::edit_page).post(handlers::blog::edit),
        )
        .route("/delete_blog/{id}", get(handlers::blog::delete))
        .route("/add_comment", post(handlers::comment::add))
        .route("/delete_comment/", post(handlers::comment::delete))
        .route(
            "/contact/",
            get(handlers::contact::contact_page).post(handlers::contact::submit),
        )
}
