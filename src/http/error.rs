use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::intake::IntakeError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// An engine error on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub IntakeError);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError(IntakeError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            IntakeError::NotFound { .. }
            | IntakeError::StepNotAvailable { .. }
            | IntakeError::NoDraft { .. } => StatusCode::NOT_FOUND,
            IntakeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            IntakeError::Storage { .. }
            | IntakeError::Database(_)
            | IntakeError::CorruptRow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(error: IntakeError) -> Self {
        ApiError(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Intake operation failed");
        } else {
            debug!(status = status.as_u16(), error = %self.0, "Intake request rejected");
        }

        let body = ErrorResponse {
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
