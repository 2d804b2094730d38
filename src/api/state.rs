//! Shared handler state.

use crate::config::Settings;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// State cloned into every request: the connection pool and the loaded settings.
#[derive(Clone)]
pub struct AppState {
    db: Arc<DatabaseConnection>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wraps an open connection and loaded settings.
    pub fn new(db: DatabaseConnection, settings: Settings) -> Self {
        Self {
            db: Arc::new(db),
            settings: Arc::new(settings),
        }
    }

    /// The connection pool.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
