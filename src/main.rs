use anyhow::Result;
use clap::Parser;

use lab_intake::cli::commands::{
    cleanup::CleanupDraftsCommand, init_config::InitConfigCommand, migrate::MigrateCommand,
    serve::ServeCommand, show::ShowCommand, show_usage, Command,
};
use lab_intake::cli::{Cli, Commands};
use lab_intake::config::IntakeConfig;
use lab_intake::telemetry::{init_telemetry, shutdown_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    IntakeConfig::load_env_file()?;
    let config = IntakeConfig::load(cli.config.as_deref())?;
    init_telemetry(&config.observability)?;

    let result = match cli.command {
        None => show_usage(),
        Some(Commands::Serve { bind }) => tokio::runtime::Runtime::new()?.block_on(async {
            ServeCommand::new(config).with_bind(bind).execute().await
        }),
        Some(Commands::Migrate) => tokio::runtime::Runtime::new()?
            .block_on(async { MigrateCommand::new(config).execute().await }),
        Some(Commands::InitConfig { path, force }) => tokio::runtime::Runtime::new()?.block_on(async {
            InitConfigCommand::new(path).with_force(force).execute().await
        }),
        Some(Commands::Show { workflow, id }) => tokio::runtime::Runtime::new()?
            .block_on(async { ShowCommand::new(config, workflow, id).execute().await }),
        Some(Commands::CleanupDrafts {
            workflow,
            keep_latest,
        }) => tokio::runtime::Runtime::new()?.block_on(async {
            CleanupDraftsCommand::new(config, workflow)
                .with_keep_latest(keep_latest)
                .execute()
                .await
        }),
    };

    shutdown_telemetry();
    result
}
