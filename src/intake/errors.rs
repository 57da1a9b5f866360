use std::path::PathBuf;
use thiserror::Error;

use crate::workflows::{Step, Workflow};

/// Errors raised by the intake engine
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("{workflow} request {id} not found")]
    NotFound { workflow: Workflow, id: i64 },

    #[error("step '{step}' is not available for {workflow} requests")]
    StepNotAvailable { workflow: Workflow, step: Step },

    #[error("No draft found")]
    NoDraft { workflow: Workflow },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

impl IntakeError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IntakeError::Storage {
            path: path.into(),
            source,
        }
    }

    /// True for the conditions that mean "the thing you asked for is not there"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            IntakeError::NotFound { .. }
                | IntakeError::StepNotAvailable { .. }
                | IntakeError::NoDraft { .. }
        )
    }
}

pub type IntakeResult<T> = Result<T, IntakeError>;
