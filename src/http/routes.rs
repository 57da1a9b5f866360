use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Extension, Router,
};

use super::handlers;
use crate::intake::IntakeService;
use crate::workflows::{Step, Workflow};

/// Largest accepted request body; document uploads are the only big ones.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: IntakeService,
    pub default_keep_latest: i64,
}

impl AppState {
    pub fn new(service: IntakeService, default_keep_latest: i64) -> Self {
        Self {
            service,
            default_keep_latest,
        }
    }
}

/// Build the full router: health check plus one route group per workflow
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().route("/healthz", get(handlers::health_check));
    for workflow in Workflow::ALL {
        router = router.merge(workflow_routes(workflow));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Routes for one workflow, derived from its descriptor.
///
/// Steps the workflow does not have are simply not mounted.
fn workflow_routes(workflow: Workflow) -> Router<AppState> {
    let spec = workflow.spec();
    let base = format!("/{}", spec.route_segment);
    let path = |suffix: &str| format!("{base}{suffix}");

    let mut router = Router::new()
        .route(&base, post(handlers::start))
        .route(&path("/"), post(handlers::start))
        .route(&path("/:id"), get(handlers::summary))
        .route(&path("/:id/full"), get(handlers::full));

    for step in spec.steps {
        router = match step {
            Step::Product => router.route(&path("/:id/product"), post(handlers::save_product)),
            Step::Details => router.route(&path("/:id/details"), post(handlers::save_details)),
            Step::Requirements => {
                router.route(&path("/:id/requirements"), post(handlers::save_requirements))
            }
            Step::Standards => {
                router.route(&path("/:id/standards"), post(handlers::save_standards))
            }
            Step::Documents => router
                .route(&path("/:id/documents"), post(handlers::save_documents))
                .route(&path("/:id/upload-documents"), post(handlers::save_documents)),
            Step::LabSelection => router
                .route(
                    &path("/:id/lab-selection/draft"),
                    post(handlers::save_lab_selection_draft),
                )
                .route(&path("/:id/submit"), post(handlers::submit)),
        };
    }

    if spec.draft_retention {
        router = router
            .route(&path("/draft"), get(handlers::latest_draft))
            .route(&path("/cleanup-drafts"), delete(handlers::cleanup_drafts));
    }

    router.layer(Extension(workflow))
}
