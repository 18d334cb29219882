use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Name of the header carrying the upstream identity
    pub fn user_header(&self) -> &str {
        &self.config.auth.user_header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_header_from_config() {
        let db = crate::db::test_database().await;
        let mut config = Config::default();
        config.auth.user_header = "x-remote-user".to_string();
        let state = AppState::new(db, config);
        assert_eq!(state.user_header(), "x-remote-user");
    }
}
