use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use super::{intake_service, Command};
use crate::config::IntakeConfig;
use crate::database::DatabaseManager;
use crate::http::{self, AppState};
use crate::shutdown::ShutdownCoordinator;

pub struct ServeCommand {
    pub config: IntakeConfig,
    pub bind: Option<String>,
}

impl ServeCommand {
    pub fn new(config: IntakeConfig) -> Self {
        Self { config, bind: None }
    }

    pub fn with_bind(mut self, bind: Option<String>) -> Self {
        self.bind = bind;
        self
    }

    fn bind_address(&self) -> &str {
        self.bind.as_deref().unwrap_or(&self.config.server.bind)
    }
}

impl Command for ServeCommand {
    async fn execute(&self) -> Result<()> {
        let database = DatabaseManager::new(&self.config.database).await?;
        let service = intake_service(&self.config, &database);
        info!(
            root = %service.layout().root.display(),
            upload_dir = %service.layout().upload_dir,
            "Document storage configured"
        );

        let bind = self.bind_address();
        let listener = TcpListener::bind(bind)
            .await
            .with_context(|| format!("Failed to bind {bind}"))?;

        let state = AppState::new(service, self.config.retention.default_keep_latest);
        let served = http::serve(listener, state, ShutdownCoordinator::new().wait_for_signal()).await;

        ShutdownCoordinator::shutdown_all_services(&database).await?;
        served
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_override() {
        let command = ServeCommand::new(IntakeConfig::default());
        assert_eq!(command.bind_address(), "127.0.0.1:8000");

        let command = command.with_bind(Some("0.0.0.0:9100".to_string()));
        assert_eq!(command.bind_address(), "0.0.0.0:9100");
    }
}
