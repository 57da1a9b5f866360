use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the intake service
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntakeConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Uploaded document storage
    pub storage: StorageConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Draft retention settings
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:8000`
    pub bind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite connection string
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Backend root; stored document paths are relative to it
    pub root: String,
    /// Upload directory below the root
    pub upload_dir: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    /// Emit JSON log lines instead of the human readable format
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetentionConfig {
    /// Drafts kept by a cleanup call that does not say otherwise
    pub default_keep_latest: i64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:8000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://database/app.db".to_string(),
                max_connections: 10,
                auto_migrate: true,
            },
            storage: StorageConfig {
                root: ".".to_string(),
                upload_dir: "database/upload".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            retention: RetentionConfig {
                default_keep_latest: 1,
            },
        }
    }
}

impl IntakeConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`lab-intake.toml`, or `explicit_file` when given)
    /// 3. Environment variables (prefixed with `LAB_INTAKE__`, sections split by `__`)
    pub fn load(explicit_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&IntakeConfig::default()).context("Failed to encode default configuration")?,
        );

        match explicit_file {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if Path::new("lab-intake.toml").exists() {
                    builder = builder.add_source(File::with_name("lab-intake"));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("LAB_INTAKE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;
        let intake_config: IntakeConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(intake_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
