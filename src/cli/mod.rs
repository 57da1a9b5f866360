use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::workflows::Workflow;

pub mod commands;

#[derive(Parser)]
#[command(name = "lab-intake")]
#[command(about = "Intake backend for lab testing, design and certification requests")]
#[command(long_about = "Lab intake serves the request wizards for testing, design and certification \
                       requests over HTTP and stores every step in SQLite. Start the server with \
                       'lab-intake serve'.")]
pub struct Cli {
    /// Configuration file to load instead of ./lab-intake.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Socket address to listen on
        #[arg(long, help = "Override server.bind, e.g. 0.0.0.0:8000")]
        bind: Option<String>,
    },
    /// Apply pending database migrations and exit
    Migrate,
    /// Write a configuration file with every default filled in
    InitConfig {
        /// Where to write the file
        #[arg(default_value = "lab-intake.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long, help = "Overwrite the file if it already exists")]
        force: bool,
    },
    /// Print the full aggregate of one request as JSON
    Show {
        /// Workflow the request belongs to
        #[arg(long, value_enum)]
        workflow: Workflow,
        /// Request id
        id: i64,
    },
    /// Delete old drafts and their uploaded files
    CleanupDrafts {
        /// Workflow whose drafts are cleaned up
        #[arg(long, value_enum, default_value = "certification")]
        workflow: Workflow,
        /// Number of newest drafts to keep
        #[arg(long, help = "Defaults to retention.default_keep_latest")]
        keep_latest: Option<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cleanup_defaults() {
        let cli = Cli::try_parse_from(["lab-intake", "cleanup-drafts"]).unwrap();
        match cli.command {
            Some(Commands::CleanupDrafts {
                workflow,
                keep_latest,
            }) => {
                assert_eq!(workflow, Workflow::Certification);
                assert_eq!(keep_latest, None);
            }
            _ => panic!("expected cleanup-drafts"),
        }
    }

    #[test]
    fn test_parse_show_with_global_config() {
        let cli = Cli::try_parse_from([
            "lab-intake",
            "show",
            "--workflow",
            "design",
            "12",
            "--config",
            "alt.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        match cli.command {
            Some(Commands::Show { workflow, id }) => {
                assert_eq!(workflow, Workflow::Design);
                assert_eq!(id, 12);
            }
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn test_unknown_workflow_rejected() {
        assert!(Cli::try_parse_from(["lab-intake", "show", "--workflow", "audit", "1"]).is_err());
    }
}
