use anyhow::Result;

use super::{with_intake_service, Command};
use crate::config::IntakeConfig;
use crate::workflows::Workflow;

pub struct CleanupDraftsCommand {
    pub config: IntakeConfig,
    pub workflow: Workflow,
    pub keep_latest: Option<i64>,
}

impl CleanupDraftsCommand {
    pub fn new(config: IntakeConfig, workflow: Workflow) -> Self {
        Self {
            config,
            workflow,
            keep_latest: None,
        }
    }

    pub fn with_keep_latest(mut self, keep_latest: Option<i64>) -> Self {
        self.keep_latest = keep_latest;
        self
    }

    fn effective_keep_latest(&self) -> i64 {
        self.keep_latest
            .unwrap_or(self.config.retention.default_keep_latest)
    }
}

impl Command for CleanupDraftsCommand {
    async fn execute(&self) -> Result<()> {
        let keep_latest = self.effective_keep_latest();
        println!(
            "🧹 Cleaning up {} drafts, keeping the newest {}",
            self.workflow, keep_latest
        );

        let report = with_intake_service(&self.config, |service| async move {
            anyhow::Ok(service.cleanup_drafts(self.workflow, keep_latest).await?)
        })
        .await?;

        println!("✅ Deleted {} old draft(s)", report.deleted);
        println!("   📄 Files removed: {}", report.files_removed);
        if report.file_failures > 0 {
            println!(
                "   ⚠️  Files that could not be removed: {} (see logs)",
                report.file_failures
            );
        }
        Ok(())
    }
}
