use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session key for queued flash messages.
const FLASH_KEY: &str = "_flash";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
}

/// A one-shot message shown on the next rendered page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

/// Queue a message for the next page render.
pub async fn push(session: &Session, level: Level, message: impl Into<String>) {
    let mut queued: Vec<Flash> = session.get(FLASH_KEY).await.ok().flatten().unwrap_or_default();
    queued.push(Flash {
        level,
        message: message.into(),
    });
    // Messages are rendered through Tera templates that autoescape, so the
    // text is stored unescaped here.
    if let Err(e) = session.insert(FLASH_KEY, &queued).await {
        tracing::warn!("Failed to store flash message: {}", e);
    }
}

/// Read and clear all queued messages.
pub async fn take(session: &Session) -> Vec<Flash> {
    match session.remove::<Vec<Flash>>(FLASH_KEY).await {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read flash messages: {}", e);
            Vec::new()
        }
    }
}
