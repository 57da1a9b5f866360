// Lab Intake Library - request wizards for testing, design and certification
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod database;
pub mod fs;
pub mod http;
pub mod intake;
pub mod observability;
pub mod shutdown;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::IntakeConfig;
pub use database::DatabaseManager;
pub use fs::{FileSystemOperations, StandardFileSystem};
pub use http::{build_router, AppState};
pub use intake::{IntakeError, IntakeResult, IntakeService, RequestStore, UploadLayout};
pub use observability::{intake_metrics, IntakeMetrics, OperationTimer};
pub use shutdown::ShutdownCoordinator;
pub use telemetry::{create_request_span, generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use workflows::{RequestStatus, Step, StateTransition, TransitionResult, Workflow, WorkflowSpec};
