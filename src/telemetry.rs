use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging.
///
/// `RUST_LOG` wins over the configured level when it is set. Logs go to
/// stderr so command output on stdout stays machine readable.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::info!("Lab intake telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the log lines of one call
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span with the common intake attributes
pub fn create_request_span(
    operation: &str,
    workflow: Option<&str>,
    request_id: Option<i64>,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "intake_request",
        operation = operation,
        workflow = workflow,
        request.id = request_id,
        correlation.id = correlation_id,
    )
}

pub fn shutdown_telemetry() {
    tracing::info!("Lab intake telemetry shutdown complete");
}
