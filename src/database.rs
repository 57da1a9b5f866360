use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

use crate::config::DatabaseConfig;

/// Database manager for the intake tables
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Open the pool, creating the database file if needed, and run migrations if enabled
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .with_context(|| format!("Invalid database url {}", config.url))?
            .create_if_missing(true)
            .foreign_keys(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating database directory {}", parent.display());
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        // Every in-memory connection is its own database, so keep exactly one.
        let max_connections = if is_in_memory(&config.url) {
            1
        } else {
            config.max_connections.max(1)
        };

        info!("Connecting to database at {}", config.url);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {}", config.url))?;

        let manager = Self { pool };
        if config.auto_migrate {
            manager.migrate().await?;
        }

        Ok(manager)
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Database migration failed")?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Get database pool for queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
