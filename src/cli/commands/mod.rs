use anyhow::Result;

use crate::config::IntakeConfig;
use crate::database::DatabaseManager;
use crate::intake::{IntakeService, RequestStore, UploadLayout};

pub mod cleanup;
pub mod init_config;
pub mod migrate;
pub mod serve;
pub mod show;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Build the engine over an open database using the configured storage layout
pub fn intake_service(config: &IntakeConfig, database: &DatabaseManager) -> IntakeService {
    IntakeService::new(
        RequestStore::new(database.pool().clone()),
        UploadLayout::new(&config.storage.root, config.storage.upload_dir.clone()),
    )
}

/// Open the database, run `f` against the engine, then close the pool
pub async fn with_intake_service<F, Fut, R>(config: &IntakeConfig, f: F) -> Result<R>
where
    F: FnOnce(IntakeService) -> Fut,
    Fut: std::future::Future<Output = Result<R>>,
{
    let database = DatabaseManager::new(&config.database).await?;
    let result = f(intake_service(config, &database)).await;
    database.shutdown().await;
    result
}

pub fn show_usage() -> Result<()> {
    println!("🧪 Lab Intake - request wizards for testing, design and certification");
    println!();
    println!("Commands:");
    println!("  🚀 lab-intake serve            # Run the HTTP server");
    println!("  🗄️  lab-intake migrate          # Apply database migrations");
    println!("  ⚙️  lab-intake init-config      # Write lab-intake.toml with defaults");
    println!("  🔎 lab-intake show --workflow testing 42");
    println!("  🧹 lab-intake cleanup-drafts --keep-latest 1");
    println!();
    println!("💡 Run 'lab-intake --help' for every option.");
    Ok(())
}
