//! Archive and data endpoints.
//!
//! # Design
//! - The pipeline is synchronous; every call runs on the blocking pool.
//! - Absence of output is `204 No Content`, never an error.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use corn_engine::GenerationRequest;
use corn_fsops::PipelineOutcome;
use corn_telemetry::pipeline_span;
use tokio::task;
use tracing::{error, info};

use crate::http::constants::{ARCHIVE_DISPOSITION, CONTENT_TYPE_ZIP};
use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn create_zip(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<GenerationRequest>,
) -> Result<Response, ApiError> {
    let pipeline = state.pipeline.clone();
    let span = pipeline_span("create_zip");
    let report = task::spawn_blocking(move || span.in_scope(|| pipeline.create_zip(&request)))
        .await
        .map_err(|err| {
            error!(error = %err, "archive pipeline task failed");
            ApiError::internal("archive pipeline task failed")
        })??;

    match report.outcome {
        PipelineOutcome::Archive { bytes, entries } => {
            info!(
                workspace = %report.workspace.token(),
                entries,
                bytes = bytes.len(),
                "returning archive"
            );
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, CONTENT_TYPE_ZIP)
                .header(header::CONTENT_DISPOSITION, ARCHIVE_DISPOSITION)
                .body(Body::from(bytes))
                .map_err(|err| {
                    error!(error = %err, "failed to build archive response");
                    ApiError::internal("failed to build archive response")
                })
        }
        PipelineOutcome::NoContent => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

pub(crate) async fn load_data(
    State(state): State<Arc<ApiState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let pipeline = state.pipeline.clone();
    let span = pipeline_span("load_data");
    let loaded = task::spawn_blocking(move || span.in_scope(|| pipeline.load_data(&path)))
        .await
        .map_err(|err| {
            error!(error = %err, "data load task failed");
            ApiError::internal("data load task failed")
        })??;

    Ok(loaded.map_or_else(
        || StatusCode::NO_CONTENT.into_response(),
        |value| Json(value).into_response(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::body::to_bytes;
    use corn_engine::GenerationEngine;
    use corn_fsops::{DirectoryArchiver, PipelineService, PipelineSettings};
    use corn_telemetry::Metrics;
    use corn_test_support::fixtures::{fixed_time, temp_dir, write_file};
    use corn_test_support::mocks::{FailingEngine, SilentEngine, WritingEngine};
    use serde_json::json;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn test_state(
        root: &TempDir,
        engine: Arc<dyn GenerationEngine>,
        cleanup: bool,
    ) -> Result<Arc<ApiState>> {
        let metrics = Metrics::new()?;
        let settings = PipelineSettings {
            target_root: root.path().join("target"),
            data_root: root.path().join("data"),
            cleanup,
        };
        let pipeline = PipelineService::new(engine, metrics.clone(), settings)
            .with_archiver(DirectoryArchiver::with_temp_dir(root.path()));
        Ok(Arc::new(ApiState::new(pipeline, metrics)))
    }

    fn request() -> Json<GenerationRequest> {
        Json(GenerationRequest::new(json!({ "template": "tmpl.corn" })))
    }

    #[tokio::test]
    async fn create_zip_returns_archive_bytes() -> Result<()> {
        let root = temp_dir("corn-api-")?;
        let engine = WritingEngine::new().with_file("a.txt", "hello", fixed_time(1_700_000_000));
        let state = test_state(&root, Arc::new(engine), true)?;

        let response = create_zip(State(state), request()).await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&header::HeaderValue::from_static(CONTENT_TYPE_ZIP))
        );
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let zip = zip::ZipArchive::new(Cursor::new(body.to_vec()))?;
        assert_eq!(zip.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn create_zip_without_workspace_is_no_content() -> Result<()> {
        let root = temp_dir("corn-api-")?;
        let state = test_state(&root, Arc::new(SilentEngine), true)?;

        let response = create_zip(State(state), request()).await?;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        Ok(())
    }

    #[tokio::test]
    async fn create_zip_reports_generation_failure() -> Result<()> {
        let root = temp_dir("corn-api-")?;
        let engine = FailingEngine::new("tmpl.corn", 12, 4, "unexpected token");
        let state = test_state(&root, Arc::new(engine), true)?;

        let Err(err) = create_zip(State(state), request()).await else {
            anyhow::bail!("expected generation failure");
        };
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.detail().is_some_and(|detail| detail.contains("unexpected token")));
        Ok(())
    }

    #[tokio::test]
    async fn load_data_returns_json_or_no_content() -> Result<()> {
        let root = temp_dir("corn-api-")?;
        write_file(
            &root.path().join("data").join("model.json"),
            br#"{"kind":"model"}"#,
            fixed_time(1_700_000_000),
        )?;
        let state = test_state(&root, Arc::new(SilentEngine), true)?;

        let found = load_data(State(Arc::clone(&state)), Path("model.json".to_string())).await?;
        assert_eq!(found.status(), StatusCode::OK);
        let body = to_bytes(found.into_body(), usize::MAX).await?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(value, json!({ "kind": "model" }));

        let missing = load_data(State(Arc::clone(&state)), Path("missing.json".to_string())).await?;
        assert_eq!(missing.status(), StatusCode::NO_CONTENT);

        let Err(rejected) = load_data(State(state), Path("../secret.json".to_string())).await else {
            anyhow::bail!("expected path rejection");
        };
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
