use anyhow::Result;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::database::DatabaseManager;
use crate::observability::intake_metrics;

/// Graceful shutdown coordinator for the intake server
pub struct ShutdownCoordinator {}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {}
    }

    /// Resolves on SIGINT or SIGTERM; hand it to the server's graceful shutdown
    pub async fn wait_for_signal(self) {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT"),
            _ = terminate => info!("Received SIGTERM"),
        }
        info!("Shutdown signal received, draining in-flight requests");
    }

    /// Close the database and log final counters
    pub async fn shutdown_all_services(database: &DatabaseManager) -> Result<()> {
        info!("Initiating graceful shutdown of all services...");

        if timeout(Duration::from_secs(10), database.shutdown())
            .await
            .is_err()
        {
            warn!("Timeout waiting for database connections to close");
        }

        intake_metrics().log_stats();

        info!("Graceful shutdown completed successfully");
        Ok(())
    }
}
