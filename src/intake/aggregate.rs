// Aggregate read model: one request plus every child row it owns

use super::errors::IntakeResult;
use super::models::{FullRequest, RequestHeader};
use super::service::IntakeService;
use crate::workflows::{Step, Workflow};

impl IntakeService {
    /// Assemble the nested view of a request.
    ///
    /// Absent singleton steps are `None` and documents default to an empty
    /// list; only a missing request is an error.
    pub async fn full(&self, workflow: Workflow, id: i64) -> IntakeResult<FullRequest> {
        let record = self.require_request(workflow, id).await?;

        let product = if workflow.supports(Step::Product) {
            self.store.find_product(id).await?
        } else {
            None
        };
        let details = if workflow.supports(Step::Details) {
            self.store.find_details(id).await?
        } else {
            None
        };
        let requirements = if workflow.supports(Step::Requirements) {
            self.store.find_requirements(id).await?
        } else {
            None
        };
        let standards = if workflow.supports(Step::Standards) {
            self.store.find_standards(id).await?
        } else {
            None
        };
        let lab = self.store.find_lab_selection(id).await?;
        let documents = self.store.list_documents(id).await?;

        Ok(FullRequest {
            workflow,
            request: RequestHeader {
                id: record.id,
                status: record.status,
                created_at: record.created_at,
                updated_at: record.updated_at,
            },
            product,
            details,
            requirements,
            standards,
            lab,
            documents,
        })
    }
}
