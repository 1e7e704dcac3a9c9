//! Health and metrics endpoints.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::StatusCode, response::Response};
use corn_telemetry::build_sha;
use tracing::error;

use crate::http::constants::CONTENT_TYPE_PROMETHEUS;
use crate::http::errors::ApiError;
use crate::models::HealthResponse;
use crate::state::ApiState;

pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let snapshot = state.telemetry.snapshot();
    Json(HealthResponse {
        status: "ok".to_string(),
        build: build_sha().to_string(),
        archive_bytes_total: snapshot.archive_bytes_total,
        cleanup_failures_total: snapshot.cleanup_failures_total,
    })
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(axum::http::header::CONTENT_TYPE, CONTENT_TYPE_PROMETHEUS)
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}
