use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use super::errors::{IntakeError, IntakeResult};
use super::models::{
    CertificationDetailsPayload, DocumentMetadata, DraftView, LabSelection, LabSelectionPayload,
    ProductDetailsPayload, RequestRecord, RequestSummary, RequirementsPayload, StandardsPayload,
    TechnicalDocument,
};
use super::store::{NewDocument, RequestStore};
use super::uploads::base_file_name;
use crate::fs::{FileSystemOperations, StandardFileSystem};
use crate::observability::intake_metrics;
use crate::workflows::state_machine::{self, StateTransition, TransitionResult};
use crate::workflows::{Step, Workflow};

/// Where uploaded documents live on disk
///
/// Stored paths are relative to `root` and always use `/` separators:
/// `<upload_dir>/<workflow storage dir>/<request id>/<file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLayout {
    pub root: PathBuf,
    pub upload_dir: String,
}

impl UploadLayout {
    pub fn new(root: impl Into<PathBuf>, upload_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            upload_dir: upload_dir.into(),
        }
    }

    /// Relative directory for one request's files
    pub fn request_dir(&self, workflow: Workflow, id: i64) -> String {
        format!(
            "{}/{}/{}",
            self.upload_dir.trim_end_matches('/'),
            workflow.spec().storage_dir,
            id
        )
    }

    /// Absolute directory holding one request's files
    pub fn request_path(&self, workflow: Workflow, id: i64) -> PathBuf {
        self.request_dir(workflow, id)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Absolute location of a stored path, if it names a file directly
    /// inside the request's own directory.
    ///
    /// Anything else (other requests, nested or parent segments, paths
    /// recorded by clients) yields `None`.
    pub fn resolve_stored(&self, workflow: Workflow, id: i64, relative: &str) -> Option<PathBuf> {
        let name = relative
            .strip_prefix(&self.request_dir(workflow, id))?
            .strip_prefix('/')?;
        if base_file_name(name) != Some(name) {
            return None;
        }
        Some(self.request_path(workflow, id).join(name))
    }
}

/// The intake engine shared by every workflow
///
/// Each operation is a short lookup-and-write against the store. Steps a
/// workflow does not have are rejected before the store is touched.
#[derive(Clone)]
pub struct IntakeService {
    pub(super) store: RequestStore,
    pub(super) fs: Arc<dyn FileSystemOperations>,
    pub(super) layout: UploadLayout,
}

impl IntakeService {
    pub fn new(store: RequestStore, layout: UploadLayout) -> Self {
        Self::with_file_system(store, layout, Arc::new(StandardFileSystem))
    }

    pub fn with_file_system(
        store: RequestStore,
        layout: UploadLayout,
        fs: Arc<dyn FileSystemOperations>,
    ) -> Self {
        Self { store, fs, layout }
    }

    pub fn store(&self) -> &RequestStore {
        &self.store
    }

    pub fn layout(&self) -> &UploadLayout {
        &self.layout
    }

    /// Create a new request in the workflow's initial status
    pub async fn start(&self, workflow: Workflow) -> IntakeResult<RequestSummary> {
        let record = self
            .store
            .insert_request(workflow, workflow.spec().initial_status)
            .await?;

        intake_metrics().record_started();
        info!(
            workflow = %workflow,
            request_id = record.id,
            status = %record.status,
            "Intake request started"
        );
        Ok(RequestSummary::from(&record))
    }

    pub async fn summary(&self, workflow: Workflow, id: i64) -> IntakeResult<RequestSummary> {
        let record = self.require_request(workflow, id).await?;
        Ok(RequestSummary::from(&record))
    }

    pub async fn save_product(
        &self,
        workflow: Workflow,
        id: i64,
        payload: &ProductDetailsPayload,
    ) -> IntakeResult<()> {
        self.require_step(workflow, Step::Product)?;
        self.require_request(workflow, id).await?;
        self.store.upsert_product(id, payload).await?;
        self.finish_step(workflow, id, Step::Product).await
    }

    pub async fn save_details(
        &self,
        workflow: Workflow,
        id: i64,
        payload: &CertificationDetailsPayload,
    ) -> IntakeResult<()> {
        self.require_step(workflow, Step::Details)?;
        self.require_request(workflow, id).await?;
        self.store.upsert_details(id, payload).await?;
        self.finish_step(workflow, id, Step::Details).await
    }

    pub async fn save_requirements(
        &self,
        workflow: Workflow,
        id: i64,
        payload: &RequirementsPayload,
    ) -> IntakeResult<()> {
        self.require_step(workflow, Step::Requirements)?;
        self.require_request(workflow, id).await?;
        self.store.upsert_requirements(id, payload).await?;
        self.finish_step(workflow, id, Step::Requirements).await
    }

    pub async fn save_standards(
        &self,
        workflow: Workflow,
        id: i64,
        payload: &StandardsPayload,
    ) -> IntakeResult<()> {
        self.require_step(workflow, Step::Standards)?;
        self.require_request(workflow, id).await?;
        self.store.upsert_standards(id, payload).await?;
        self.finish_step(workflow, id, Step::Standards).await
    }

    /// Append metadata rows for documents stored elsewhere.
    ///
    /// Rows are never replaced: saving the step again adds more rows.
    pub async fn save_documents(
        &self,
        workflow: Workflow,
        id: i64,
        documents: Vec<DocumentMetadata>,
    ) -> IntakeResult<Vec<TechnicalDocument>> {
        self.require_step(workflow, Step::Documents)?;
        self.require_request(workflow, id).await?;

        if let Some(path) = documents
            .iter()
            .filter_map(|document| document.file_path.as_deref())
            .find(|path| !is_plain_relative_path(path))
        {
            return Err(IntakeError::Validation(format!(
                "file_path '{path}' must be a relative path without '..' segments"
            )));
        }

        let rows: Vec<NewDocument> = documents
            .into_iter()
            .enumerate()
            .map(|(index, document)| NewDocument {
                doc_type: document.doc_type,
                file_name: document.file_name,
                file_path: document.file_path,
                file_size: document.file_size.unwrap_or(0),
                display_order: index as i64,
            })
            .collect();

        let inserted = self.store.insert_documents(id, &rows).await?;
        intake_metrics().record_documents(inserted.len() as u64);
        debug!(
            workflow = %workflow,
            request_id = id,
            count = inserted.len(),
            "Document metadata recorded"
        );
        Ok(inserted)
    }

    /// Save the lab selection without changing the request status
    pub async fn save_lab_selection_draft(
        &self,
        workflow: Workflow,
        id: i64,
        payload: &LabSelectionPayload,
    ) -> IntakeResult<LabSelection> {
        self.require_step(workflow, Step::LabSelection)?;
        self.require_request(workflow, id).await?;
        let lab = self.store.upsert_lab_selection(id, payload).await?;
        intake_metrics().record_step_saved();
        debug!(workflow = %workflow, request_id = id, "Lab selection draft saved");
        Ok(lab)
    }

    /// Save the lab selection and mark the request submitted.
    ///
    /// No other step has to be completed first.
    pub async fn submit(
        &self,
        workflow: Workflow,
        id: i64,
        payload: &LabSelectionPayload,
    ) -> IntakeResult<RequestSummary> {
        self.require_step(workflow, Step::LabSelection)?;
        let record = self.require_request(workflow, id).await?;

        let transition = state_machine::apply(record.status, StateTransition::Submit);
        self.store.submit_with_lab_selection(id, payload).await?;

        match transition {
            TransitionResult::Changed {
                previous_state,
                new_state,
            } => {
                intake_metrics().record_submitted();
                info!(
                    workflow = %workflow,
                    request_id = id,
                    from = %previous_state,
                    to = %new_state,
                    "Intake request submitted"
                );
            }
            TransitionResult::Unchanged { state } => {
                info!(
                    workflow = %workflow,
                    request_id = id,
                    status = %state,
                    "Lab selection resubmitted"
                );
            }
        }

        Ok(RequestSummary {
            id,
            status: transition.new_state(),
        })
    }

    /// Newest draft of a workflow
    pub async fn latest_draft(&self, workflow: Workflow) -> IntakeResult<DraftView> {
        let record = self
            .store
            .latest_draft(workflow)
            .await?
            .ok_or(IntakeError::NoDraft { workflow })?;

        let details = if workflow.supports(Step::Details) {
            self.store.find_details(record.id).await?
        } else {
            None
        };

        Ok(DraftView {
            id: record.id,
            status: record.status,
            created_at: record.created_at,
            details,
        })
    }

    pub(super) async fn require_request(
        &self,
        workflow: Workflow,
        id: i64,
    ) -> IntakeResult<RequestRecord> {
        self.store
            .find_request(workflow, id)
            .await?
            .ok_or(IntakeError::NotFound { workflow, id })
    }

    pub(super) fn require_step(&self, workflow: Workflow, step: Step) -> IntakeResult<()> {
        if workflow.supports(step) {
            Ok(())
        } else {
            Err(IntakeError::StepNotAvailable { workflow, step })
        }
    }

    async fn finish_step(&self, workflow: Workflow, id: i64, step: Step) -> IntakeResult<()> {
        self.store.touch_request(id).await?;
        intake_metrics().record_step_saved();
        debug!(workflow = %workflow, request_id = id, step = %step, "Step saved");
        Ok(())
    }
}

/// A client recorded path: relative, `/` separated, no parent segments
fn is_plain_relative_path(path: &str) -> bool {
    !path.starts_with('/')
        && !path.contains('\\')
        && !path.contains(':')
        && path.split('/').all(|segment| segment != "..")
}
