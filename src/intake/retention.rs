use tracing::{info, warn};

use super::errors::{IntakeError, IntakeResult};
use super::models::RetentionReport;
use super::service::IntakeService;
use crate::observability::{intake_metrics, OperationTimer};
use crate::workflows::Workflow;

impl IntakeService {
    /// Delete every draft of `workflow` except the newest `keep_latest`.
    ///
    /// Document files of a removed draft are deleted first, best effort: a
    /// file that cannot be removed is logged and counted, and the draft row
    /// is still deleted. Only files inside the draft's own upload directory
    /// are touched. Child rows are removed by the foreign-key cascade.
    pub async fn cleanup_drafts(
        &self,
        workflow: Workflow,
        keep_latest: i64,
    ) -> IntakeResult<RetentionReport> {
        if keep_latest < 0 {
            return Err(IntakeError::Validation(format!(
                "keep_latest must not be negative (got {keep_latest})"
            )));
        }

        let timer = OperationTimer::new("cleanup_drafts");
        let drafts = self.store.list_drafts(workflow).await?;
        let mut report = RetentionReport::default();

        for draft in drafts.iter().skip(keep_latest as usize) {
            let documents = self.store.list_documents(draft.id).await?;

            for document in &documents {
                let Some(relative) = document.file_path.as_deref() else {
                    continue;
                };
                let Some(path) = self.layout.resolve_stored(workflow, draft.id, relative) else {
                    warn!(
                        workflow = %workflow,
                        request_id = draft.id,
                        file_path = relative,
                        "Skipping document path outside the draft's upload directory"
                    );
                    continue;
                };
                if !self.fs.exists(&path) {
                    continue;
                }
                match self.fs.remove_file(&path).await {
                    Ok(()) => report.files_removed += 1,
                    Err(e) => {
                        report.file_failures += 1;
                        intake_metrics().record_file_delete_failure();
                        warn!(
                            workflow = %workflow,
                            request_id = draft.id,
                            path = %path.display(),
                            error = %e,
                            "Failed to delete draft document file"
                        );
                    }
                }
            }

            if self.store.delete_request(draft.id).await? {
                report.deleted += 1;
            }
        }

        intake_metrics().record_drafts_removed(report.deleted);
        info!(
            workflow = %workflow,
            keep_latest,
            deleted = report.deleted,
            files_removed = report.files_removed,
            file_failures = report.file_failures,
            "Draft cleanup finished"
        );
        timer.finish();
        Ok(report)
    }
}
