//! Wire models shared by the HTTP handlers.

use corn_engine::ScriptDiagnostic;
use serde::{Deserialize, Serialize};

/// RFC9457 problem document returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    /// Problem type URI.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short, constant summary.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Engine diagnostic when a generation script failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<ScriptDiagnostic>,
    /// Offending request parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_params: Option<Vec<ProblemInvalidParam>>,
}

/// Invalid parameter pointer surfaced alongside a [`ProblemDetails`] payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemInvalidParam {
    /// JSON pointer or path segment naming the parameter.
    pub pointer: String,
    /// Why the value was rejected.
    pub message: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: String,
    /// Build identifier.
    pub build: String,
    /// Bytes of archives returned so far.
    pub archive_bytes_total: u64,
    /// Workspaces whose cleanup did not complete.
    pub cleanup_failures_total: u64,
}
