use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, Instrument};

use super::error::ApiError;
use super::extract::ApiJson;
use super::routes::AppState;
use crate::intake::{
    CertificationDetailsPayload, DocumentsPayload, DraftView, FullRequest, LabSelectionPayload,
    ProductDetailsPayload, RequestSummary, RequirementsPayload, StandardsPayload, UploadedFile,
};
use crate::telemetry::{create_request_span, generate_correlation_id};
use crate::workflows::Workflow;

type ApiResult<T> = Result<T, ApiError>;

fn span(operation: &str, workflow: Workflow, id: Option<i64>) -> tracing::Span {
    create_request_span(
        operation,
        Some(workflow.as_str()),
        id,
        &generate_correlation_id(),
    )
}

fn saved() -> Json<serde_json::Value> {
    Json(json!({ "status": "saved" }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn start(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
) -> ApiResult<Json<RequestSummary>> {
    async move { Ok(Json(state.service.start(workflow).await?)) }
        .instrument(span("start", workflow, None))
        .await
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RequestSummary>> {
    async move { Ok(Json(state.service.summary(workflow, id).await?)) }
        .instrument(span("summary", workflow, Some(id)))
        .await
}

pub async fn full(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
    Path(id): Path<i64>,
) -> ApiResult<Json<FullRequest>> {
    async move { Ok(Json(state.service.full(workflow, id).await?)) }
        .instrument(span("full", workflow, Some(id)))
        .await
}

pub async fn save_product(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<ProductDetailsPayload>,
) -> ApiResult<Json<serde_json::Value>> {
    async move {
        state.service.save_product(workflow, id, &payload).await?;
        Ok(saved())
    }
    .instrument(span("save_product", workflow, Some(id)))
    .await
}

pub async fn save_details(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<CertificationDetailsPayload>,
) -> ApiResult<Json<serde_json::Value>> {
    async move {
        state.service.save_details(workflow, id, &payload).await?;
        Ok(saved())
    }
    .instrument(span("save_details", workflow, Some(id)))
    .await
}

pub async fn save_requirements(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<RequirementsPayload>,
) -> ApiResult<Json<serde_json::Value>> {
    async move {
        state.service.save_requirements(workflow, id, &payload).await?;
        Ok(saved())
    }
    .instrument(span("save_requirements", workflow, Some(id)))
    .await
}

pub async fn save_standards(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<StandardsPayload>,
) -> ApiResult<Json<serde_json::Value>> {
    async move {
        state.service.save_standards(workflow, id, &payload).await?;
        Ok(saved())
    }
    .instrument(span("save_standards", workflow, Some(id)))
    .await
}

/// Documents step: JSON metadata or a multipart upload, chosen by content type
pub async fn save_documents(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
    Path(id): Path<i64>,
    request: Request,
) -> ApiResult<Response> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        async move {
            let (files, doc_types) = read_upload_form(multipart).await?;
            let documents = state
                .service
                .upload_documents(workflow, id, files, doc_types)
                .await?;
            Ok(Json(documents).into_response())
        }
        .instrument(span("upload_documents", workflow, Some(id)))
        .await
    } else {
        let ApiJson(payload) = ApiJson::<DocumentsPayload>::from_request(request, &state).await?;
        async move {
            let documents = state
                .service
                .save_documents(workflow, id, payload.into_documents())
                .await?;
            Ok(Json(json!({ "status": "documents saved", "count": documents.len() })).into_response())
        }
        .instrument(span("save_documents", workflow, Some(id)))
        .await
    }
}

/// Collect repeated `files` parts and `doc_types` text parts in arrival order
async fn read_upload_form(mut multipart: Multipart) -> ApiResult<(Vec<UploadedFile>, Vec<String>)> {
    let mut files = Vec::new();
    let mut doc_types = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("files") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(e.body_text()))?;
                files.push(UploadedFile {
                    file_name,
                    content: content.to_vec(),
                });
            }
            Some("doc_types") => {
                let doc_type = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(e.body_text()))?;
                doc_types.push(doc_type);
            }
            _ => {}
        }
    }

    Ok((files, doc_types))
}

pub async fn save_lab_selection_draft(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<LabSelectionPayload>,
) -> ApiResult<Json<serde_json::Value>> {
    async move {
        let lab = state
            .service
            .save_lab_selection_draft(workflow, id, &payload)
            .await?;
        Ok(Json(json!({ "status": "draft saved", "lab": lab })))
    }
    .instrument(span("save_lab_selection_draft", workflow, Some(id)))
    .await
}

pub async fn submit(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<LabSelectionPayload>,
) -> ApiResult<Json<serde_json::Value>> {
    async move {
        let summary = state.service.submit(workflow, id, &payload).await?;
        Ok(Json(json!({ "status": summary.status })))
    }
    .instrument(span("submit", workflow, Some(id)))
    .await
}

pub async fn latest_draft(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
) -> ApiResult<Json<DraftView>> {
    async move { Ok(Json(state.service.latest_draft(workflow).await?)) }
        .instrument(span("latest_draft", workflow, None))
        .await
}

#[derive(Debug, Deserialize)]
pub struct CleanupQuery {
    pub keep_latest: Option<i64>,
}

pub async fn cleanup_drafts(
    State(state): State<AppState>,
    Extension(workflow): Extension<Workflow>,
    Query(query): Query<CleanupQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let keep_latest = query.keep_latest.unwrap_or(state.default_keep_latest);
    async move {
        let report = state.service.cleanup_drafts(workflow, keep_latest).await?;
        info!(
            deleted = report.deleted,
            files_removed = report.files_removed,
            file_failures = report.file_failures,
            "Draft cleanup finished"
        );
        Ok(Json(json!({
            "status": "success",
            "deleted_count": report.deleted,
            "message": format!("Deleted {} old draft(s)", report.deleted),
        })))
    }
    .instrument(span("cleanup_drafts", workflow, None))
    .await
}
