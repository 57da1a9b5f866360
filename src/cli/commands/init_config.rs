use anyhow::{bail, Result};
use std::path::PathBuf;

use super::Command;
use crate::config::IntakeConfig;

pub struct InitConfigCommand {
    pub path: PathBuf,
    pub force: bool,
}

impl InitConfigCommand {
    pub fn new(path: PathBuf) -> Self {
        Self { path, force: false }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

impl Command for InitConfigCommand {
    async fn execute(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                self.path.display()
            );
        }

        IntakeConfig::default().save_to_file(&self.path)?;
        println!("⚙️  Wrote default configuration to {}", self.path.display());
        Ok(())
    }
}
