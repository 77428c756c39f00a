pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::state::AppState;

/// Session expiry (24 hours of inactivity).
const SESSION_EXPIRY_HOURS: i64 = 24;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_http_only(true)
        // Lax, not Strict: the login redirect must carry the cookie.
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_EXPIRY_HOURS)));

    axum::Router::new()
        .merge(routes::routes())
        .nest_service("/media", ServeDir::new(&state.config.media.root))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
