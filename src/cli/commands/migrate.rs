use anyhow::Result;

use super::Command;
use crate::config::IntakeConfig;
use crate::database::DatabaseManager;

pub struct MigrateCommand {
    pub config: IntakeConfig,
}

impl MigrateCommand {
    pub fn new(config: IntakeConfig) -> Self {
        Self { config }
    }
}

impl Command for MigrateCommand {
    async fn execute(&self) -> Result<()> {
        let mut database_config = self.config.database.clone();
        database_config.auto_migrate = false;

        let database = DatabaseManager::new(&database_config).await?;
        database.migrate().await?;
        database.shutdown().await;

        println!("✅ Database at {} is up to date", database_config.url);
        Ok(())
    }
}
