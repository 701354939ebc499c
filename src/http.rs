//! HTTP surface for the feedback form and the admin views

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio_util::io::ReaderStream;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{error, warn};

use crate::archive::ARCHIVE_FILENAME;
use crate::error::FeedbackError;
use crate::models::{Employee, FeedbackSubmission, SubmitResponse};
use crate::store::FeedbackStore;

pub struct AppState {
    pub store: Arc<FeedbackStore>,
}

impl AppState {
    pub fn new(store: FeedbackStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Build the router. When `public_dir` is set its files are served for any
/// path the API does not claim.
pub fn create_router(state: Arc<AppState>, public_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/api/feedback", get(list_feedback).post(submit_feedback))
        .route("/api/download-all", get(download_all))
        .route("/api/employees", get(list_employees))
        .with_state(state)
        .layer(CorsLayer::permissive());

    match public_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(SubmitResponse::failed(message))).into_response()
}

async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeedbackSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected feedback payload");
            return failure(
                StatusCode::BAD_REQUEST,
                &format!("Invalid feedback: {}", rejection.body_text()),
            );
        }
    };

    let store = Arc::clone(&state.store);
    let outcome = tokio::task::spawn_blocking(move || store.store(&submission)).await;

    match outcome {
        Ok(Ok(_)) => Json(SubmitResponse::ok("Feedback saved successfully")).into_response(),
        Ok(Err(FeedbackError::InvalidSubmission(reason))) => {
            warn!(%reason, "rejected feedback payload");
            failure(
                StatusCode::BAD_REQUEST,
                &format!("Invalid feedback: {reason}"),
            )
        }
        Ok(Err(err)) => {
            error!(error = %err, "error saving feedback");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Error saving feedback")
        }
        Err(err) => {
            error!(error = %err, "feedback save task failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Error saving feedback")
        }
    }
}

async fn list_feedback(State(state): State<Arc<AppState>>) -> Response {
    let store = Arc::clone(&state.store);
    match tokio::task::spawn_blocking(move || store.list_all()).await {
        Ok(Ok(records)) => Json(records).into_response(),
        Ok(Err(err)) => {
            error!(error = %err, "error reading feedback");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Error reading feedback")
        }
        Err(err) => {
            error!(error = %err, "feedback listing task failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Error reading feedback")
        }
    }
}

async fn download_all(State(state): State<Arc<AppState>>) -> Response {
    let store = Arc::clone(&state.store);
    let spool = match tokio::task::spawn_blocking(move || store.export_all()).await {
        Ok(Ok(spool)) => spool,
        Ok(Err(err)) => {
            error!(error = %err, "error creating ZIP");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "Error creating ZIP");
        }
        Err(err) => {
            error!(error = %err, "archive task failed");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "Error creating ZIP");
        }
    };

    let stream = ReaderStream::new(tokio::fs::File::from_std(spool));
    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ARCHIVE_FILENAME}\""),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

async fn list_employees(State(state): State<Arc<AppState>>) -> Json<Vec<Employee>> {
    Json(state.store.directory().employees().cloned().collect())
}
