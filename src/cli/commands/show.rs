use anyhow::Result;

use super::{with_intake_service, Command};
use crate::config::IntakeConfig;
use crate::workflows::Workflow;

pub struct ShowCommand {
    pub config: IntakeConfig,
    pub workflow: Workflow,
    pub id: i64,
}

impl ShowCommand {
    pub fn new(config: IntakeConfig, workflow: Workflow, id: i64) -> Self {
        Self {
            config,
            workflow,
            id,
        }
    }
}

impl Command for ShowCommand {
    async fn execute(&self) -> Result<()> {
        let full = with_intake_service(&self.config, |service| async move {
            anyhow::Ok(service.full(self.workflow, self.id).await?)
        })
        .await?;

        println!("{}", serde_json::to_string_pretty(&full)?);
        Ok(())
    }
}
