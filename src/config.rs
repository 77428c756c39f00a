use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Directory uploaded files are written to and served from under /media.
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TemplatesConfig {
    /// Glob passed to Tera at startup.
    pub glob: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub media: MediaConfig,
    pub templates: TemplatesConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("media.root", "media")?
            .set_default("templates.glob", "templates/**/*.html")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., SORREL__DATABASE__URL)
            .add_source(Environment::with_prefix("SORREL").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
