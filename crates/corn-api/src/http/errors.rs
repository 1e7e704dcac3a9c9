//! RFC9457-style API error wrapper.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use corn_engine::ScriptDiagnostic;
use corn_fsops::FsOpsError;

use crate::http::constants::{
    PROBLEM_ARCHIVE_FAILED, PROBLEM_BAD_REQUEST, PROBLEM_GENERATION_FAILED, PROBLEM_INTERNAL,
};
use crate::models::{ProblemDetails, ProblemInvalidParam};

/// Structured API error with optional RFC9457 fields.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    kind: &'static str,
    title: &'static str,
    detail: Option<String>,
    diagnostic: Option<ScriptDiagnostic>,
    invalid_params: Option<Vec<ProblemInvalidParam>>,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str, title: &'static str) -> Self {
        Self {
            status,
            kind,
            title,
            detail: None,
            diagnostic: None,
            invalid_params: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn with_invalid_params(mut self, params: Vec<ProblemInvalidParam>) -> Self {
        self.invalid_params = Some(params);
        self
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_INTERNAL,
            "internal server error",
        )
        .with_detail(message)
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_BAD_REQUEST, "bad request").with_detail(detail)
    }

    pub(crate) fn generation_failed(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            PROBLEM_GENERATION_FAILED,
            "generation failed",
        )
        .with_detail(detail)
    }

    pub(crate) fn archive_failed(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_ARCHIVE_FAILED,
            "archive failed",
        )
        .with_detail(detail)
    }

    #[cfg(test)]
    pub(crate) const fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub(crate) fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl From<FsOpsError> for ApiError {
    fn from(err: FsOpsError) -> Self {
        match err {
            FsOpsError::Generation { ref source, .. } => {
                let diagnostic = source.diagnostic().cloned();
                let mut api = Self::generation_failed(err.to_string());
                api.diagnostic = diagnostic;
                api
            }
            FsOpsError::InvalidInput {
                field,
                reason,
                ref value,
            } => Self::bad_request(format!(
                "{field} rejected: {reason}{}",
                value
                    .as_deref()
                    .map(|value| format!(" ({value})"))
                    .unwrap_or_default()
            ))
            .with_invalid_params(vec![ProblemInvalidParam {
                pointer: field.to_string(),
                message: reason.to_string(),
            }]),
            FsOpsError::Io { .. } | FsOpsError::Walkdir { .. } | FsOpsError::Zip { .. } => {
                Self::archive_failed(error_chain(&err))
            }
            FsOpsError::Data { .. } | FsOpsError::Cleanup { .. } => {
                Self::internal(error_chain(&err))
            }
        }
    }
}

/// Render an error and its sources as `outer: inner: root`.
pub(crate) fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        rendered.push_str(": ");
        rendered.push_str(&source.to_string());
        current = source.source();
    }
    if let Some(path) = err
        .downcast_ref::<FsOpsError>()
        .and_then(FsOpsError::path)
    {
        rendered.push_str(&format!(" [{}]", path.display()));
    }
    rendered
}

impl Display for ApiError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(formatter, "{}: {detail}", self.title),
            None => formatter.write_str(self.title),
        }
    }
}

impl Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ProblemDetails {
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
            diagnostic: self.diagnostic,
            invalid_params: self.invalid_params,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::body::to_bytes;
    use corn_engine::EngineError;
    use std::io;
    use std::path::PathBuf;

    #[tokio::test]
    async fn generation_failure_maps_to_unprocessable_with_diagnostic() -> Result<()> {
        let diagnostic = ScriptDiagnostic {
            file: "tmpl.corn".to_string(),
            line: 12,
            column: 4,
            message: "unexpected token".to_string(),
        };
        let err = ApiError::from(FsOpsError::Generation {
            workspace: PathBuf::from("target/abc"),
            source: EngineError::Script {
                diagnostic: diagnostic.clone(),
            },
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = err.into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let problem: ProblemDetails = serde_json::from_slice(&body)?;
        assert_eq!(problem.status, 422);
        assert_eq!(problem.kind, PROBLEM_GENERATION_FAILED);
        assert_eq!(problem.diagnostic, Some(diagnostic));
        let detail = problem.detail.unwrap_or_default();
        assert!(detail.contains("tmpl.corn"));
        assert!(detail.contains("line: 12"));
        assert!(detail.contains("column: 4"));
        Ok(())
    }

    #[test]
    fn archive_failure_keeps_error_chain_and_path() {
        let err = ApiError::from(FsOpsError::Io {
            operation: "archive.open_source",
            path: PathBuf::from("target/abc/a.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = err.detail().unwrap_or_default();
        assert!(detail.contains("fsops io failure: denied"));
        assert!(detail.contains("a.txt"));
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err = ApiError::from(FsOpsError::InvalidInput {
            field: "data_path",
            reason: "invalid_segment",
            value: Some("../x".to_string()),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.detail(),
            Some("data_path rejected: invalid_segment (../x)")
        );
    }
}
