use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tera::Tera;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub templates: Arc<Tera>,
}

impl AppState {
    /// Load the template set and assemble the shared state.
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Result<Self, tera::Error> {
        let templates = Tera::new(&config.templates.glob)?;

        Ok(Self {
            db,
            config,
            templates: Arc::new(templates),
        })
    }
}
