use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Intake activity counters
#[derive(Debug, Default)]
pub struct IntakeMetrics {
    pub requests_started: AtomicU64,
    pub steps_saved: AtomicU64,
    pub documents_recorded: AtomicU64,
    pub requests_submitted: AtomicU64,
    pub drafts_removed: AtomicU64,
    pub file_delete_failures: AtomicU64,
}

impl IntakeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_started(&self) {
        self.requests_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_step_saved(&self) {
        self.steps_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_documents(&self, count: u64) {
        self.documents_recorded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_submitted(&self) {
        self.requests_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drafts_removed(&self, count: u64) {
        self.drafts_removed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_file_delete_failure(&self) {
        self.file_delete_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> IntakeStats {
        IntakeStats {
            requests_started: self.requests_started.load(Ordering::Relaxed),
            steps_saved: self.steps_saved.load(Ordering::Relaxed),
            documents_recorded: self.documents_recorded.load(Ordering::Relaxed),
            requests_submitted: self.requests_submitted.load(Ordering::Relaxed),
            drafts_removed: self.drafts_removed.load(Ordering::Relaxed),
            file_delete_failures: self.file_delete_failures.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Intake metrics: started={}, steps={}, documents={}, submitted={}, drafts_removed={}, file_delete_failures={}",
            stats.requests_started,
            stats.steps_saved,
            stats.documents_recorded,
            stats.requests_submitted,
            stats.drafts_removed,
            stats.file_delete_failures
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeStats {
    pub requests_started: u64,
    pub steps_saved: u64,
    pub documents_recorded: u64,
    pub requests_submitted: u64,
    pub drafts_removed: u64,
    pub file_delete_failures: u64,
}

/// Global metrics instance
static INTAKE_METRICS: std::sync::LazyLock<IntakeMetrics> =
    std::sync::LazyLock::new(IntakeMetrics::new);

pub fn intake_metrics() -> &'static IntakeMetrics {
    &INTAKE_METRICS
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}
