//! Shared application state, cloned into every handler.

use std::sync::Arc;

use shopfront_db::{Database, DbConfig, DbError};

use crate::auth::SessionManager;
use crate::config::ServerConfig;
use crate::mailer::{LogMailer, Mailer};
use crate::templates::Pages;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Page template failed to compile: {0}")]
    Template(#[from] handlebars::TemplateError),
}

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionManager,
    pub config: Arc<ServerConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub pages: Arc<Pages>,
}

impl AppState {
    pub fn new(
        db: Database,
        config: ServerConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, StartupError> {
        let sessions = SessionManager::new(
            config.session.secret.clone(),
            config.session.lifetime_secs,
        );
        Ok(AppState {
            db,
            sessions,
            config: Arc::new(config),
            mailer,
            pages: Arc::new(Pages::new()?),
        })
    }

    /// Opens the configured database and wires the log mailer.
    pub async fn connect(config: ServerConfig) -> Result<Self, StartupError> {
        let db_config = if config.database.path == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&config.database.path).max_connections(config.database.max_connections)
        };
        let db = Database::new(db_config).await?;
        AppState::new(db, config, Arc::new(LogMailer))
    }
}
