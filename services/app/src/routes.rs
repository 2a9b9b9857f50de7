use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use skirnir::workflows::assessment::{
    AssessmentReport, ScoringEngine, Selection, SelectionEntry, TableError,
};
use skirnir::workflows::upload::{
    BlobTransport, ContainerLister, CredentialIssuer, UploadOrchestrator, UploadOutcome,
};

use crate::infra::AppState;

/// Shared handler context: the scoring engine plus the single orchestrator
/// instance that serializes uploads.
pub(crate) struct WorkflowFacade<I, T, L> {
    pub(crate) engine: Arc<ScoringEngine>,
    pub(crate) orchestrator: Arc<UploadOrchestrator<I, T, L>>,
}

impl<I, T, L> Clone for WorkflowFacade<I, T, L> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssessmentRequest {
    pub(crate) selections: Vec<SelectionEntry>,
}

pub(crate) fn with_workflow_routes<I, T, L>(facade: WorkflowFacade<I, T, L>) -> Router
where
    I: CredentialIssuer + 'static,
    T: BlobTransport + 'static,
    L: ContainerLister + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(submit_assessment_endpoint::<I, T, L>))
        .route("/api/v1/gallery", get(gallery_endpoint::<I, T, L>))
        .with_state(facade)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Score the submitted selection, render the CSV, and push it through the
/// credential/upload/refresh chain.
pub(crate) async fn submit_assessment_endpoint<I, T, L>(
    axum::extract::State(facade): axum::extract::State<WorkflowFacade<I, T, L>>,
    Json(payload): Json<AssessmentRequest>,
) -> (StatusCode, Json<serde_json::Value>)
where
    I: CredentialIssuer + 'static,
    T: BlobTransport + 'static,
    L: ContainerLister + 'static,
{
    let selection: Selection = payload.selections.into_iter().collect();
    if selection.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "no selections provided" })),
        );
    }

    let report = match AssessmentReport::generate(&facade.engine, &selection, Utc::now()) {
        Ok(report) => report,
        Err(err @ TableError::UnknownOption { .. }) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": err.to_string() })),
            );
        }
        Err(err) => {
            tracing::error!(%err, "assessment score table is misconfigured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            );
        }
    };

    if let Err(err) = facade
        .orchestrator
        .stage(report.filename.clone(), report.csv.clone().into_bytes())
    {
        return (StatusCode::CONFLICT, Json(json!({ "error": err.to_string() })));
    }

    let outcome = match facade.orchestrator.upload().await {
        Ok(outcome) => outcome,
        Err(err) => {
            return (StatusCode::CONFLICT, Json(json!({ "error": err.to_string() })));
        }
    };

    let (status, outcome_value) = match &outcome {
        UploadOutcome::Success => (StatusCode::OK, json!({ "status": "success" })),
        UploadOutcome::Failure(reason) => (
            StatusCode::BAD_GATEWAY,
            json!({ "status": "failure", "reason": reason }),
        ),
    };

    (
        status,
        Json(json!({
            "filename": report.filename,
            "total": report.summary.total(),
            "rows": report.summary.rows(),
            "outcome": outcome_value,
        })),
    )
}

/// Current container listing in backend order. A listing failure answers
/// with the last-known entries marked stale instead of an error, so the
/// gallery never blanks out.
pub(crate) async fn gallery_endpoint<I, T, L>(
    axum::extract::State(facade): axum::extract::State<WorkflowFacade<I, T, L>>,
) -> (StatusCode, Json<serde_json::Value>)
where
    I: CredentialIssuer + 'static,
    T: BlobTransport + 'static,
    L: ContainerLister + 'static,
{
    match facade.orchestrator.refresh_gallery().await {
        Ok(entries) => (
            StatusCode::OK,
            Json(json!({ "entries": entries, "stale": false })),
        ),
        Err(err) => (
            StatusCode::OK,
            Json(json!({
                "entries": facade.orchestrator.gallery(),
                "stale": true,
                "error": err.to_string(),
            })),
        ),
    }
}
