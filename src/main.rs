use std::net::SocketAddr;

use tracing::{Level, info};

use sorrel::config::AppConfig;
use sorrel::state::AppState;
use sorrel::utils::upload::{AVATAR_DIR, BLOG_IMAGE_DIR};
use sorrel::{database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database.url).await?;
    seed::ensure_contact_info(&db).await?;

    tokio::fs::create_dir_all(config.media.root.join(BLOG_IMAGE_DIR)).await?;
    tokio::fs::create_dir_all(config.media.root.join(AVATAR_DIR)).await?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::new(config, db)?;
    let app = sorrel::build_router(state);

    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
