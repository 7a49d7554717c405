use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    // Every connection to an in-memory SQLite database opens a fresh one.
    let max_connections = if is_in_memory(&config.database_url) {
        1
    } else {
        config.database_max_connections.max(1)
    };
    options.max_connections(max_connections).sqlx_logging(false);

    Database::connect(options)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))
}

fn is_in_memory(url: &str) -> bool {
    url.starts_with("sqlite:") && url.contains(":memory:")
}
