use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, UserId};
use super::draft::DraftForm;
use super::repository::{RecordStore, RepositoryError};
use super::service::{TutorVettingService, VettingServiceError};
use super::storage::BlobStorage;
use super::validator::validate_draft;

/// Submission payload: the owning account plus the full draft, documents
/// included as raw bytes.
#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    pub user_id: String,
    pub draft: DraftForm,
}

/// Router builder exposing HTTP endpoints for vetting intake and status.
pub fn vetting_router<S, R>(service: Arc<TutorVettingService<S, R>>) -> Router
where
    S: BlobStorage + 'static,
    R: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/vetting/applications", post(submit_handler::<S, R>))
        .route(
            "/api/v1/vetting/applications/:application_id",
            get(status_handler::<S, R>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<S, R>(
    State(service): State<Arc<TutorVettingService<S, R>>>,
    axum::Json(request): axum::Json<SubmissionRequest>,
) -> Response
where
    S: BlobStorage + 'static,
    R: RecordStore + 'static,
{
    // The wizard gates steps one at a time; a direct API caller gets the full
    // draft checked in one pass instead.
    if let Err(error) = validate_draft(&request.draft) {
        let payload = json!({ "error": error.to_string() });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }

    let user_id = UserId(request.user_id);
    match service.submit(&user_id, &request.draft) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(VettingServiceError::Storage(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(VettingServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({ "error": "application already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<S, R>(
    State(service): State<Arc<TutorVettingService<S, R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: BlobStorage + 'static,
    R: RecordStore + 'static,
{
    let id = ApplicationId(application_id);
    match service.status(&id) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(VettingServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "application_id": id.0,
                "error": "application not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
