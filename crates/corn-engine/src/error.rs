//! # Design
//!
//! - Keep the engine's own diagnostics intact; they are the only way to locate a script error.
//! - Other variants use constant messages and carry context in fields.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::ScriptDiagnostic;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors produced at the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected the request with a positioned diagnostic.
    #[error("generation script failed: {diagnostic}")]
    Script {
        /// Diagnostic reported by the engine.
        diagnostic: ScriptDiagnostic,
    },
    /// The engine process could not be started.
    #[error("failed to launch generation engine")]
    Launch {
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The engine exited unsuccessfully without a parseable diagnostic.
    #[error("generation engine exited with {status}: {stderr}")]
    Exited {
        /// Program that exited.
        program: String,
        /// Rendered exit status.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },
    /// IO failures while talking to the engine or reading its data.
    #[error("engine io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The request could not be encoded for the engine.
    #[error("failed to encode generation request")]
    Encode {
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// A data file did not contain valid JSON.
    #[error("failed to parse json data")]
    Json {
        /// Path of the data file.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

impl EngineError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Diagnostic attached to a script failure, if any.
    #[must_use]
    pub const fn diagnostic(&self) -> Option<&ScriptDiagnostic> {
        match self {
            Self::Script { diagnostic } => Some(diagnostic),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn script_error_keeps_diagnostic_in_message() {
        let error = EngineError::Script {
            diagnostic: ScriptDiagnostic {
                file: "tmpl.corn".to_string(),
                line: 12,
                column: 4,
                message: "unexpected token".to_string(),
            },
        };
        let rendered = error.to_string();
        assert!(rendered.contains("tmpl.corn"));
        assert!(rendered.contains("line: 12"));
        assert!(rendered.contains("column: 4"));
        assert!(rendered.contains("unexpected token"));
        assert!(error.diagnostic().is_some());
    }

    #[test]
    fn io_helper_preserves_source() {
        let error = EngineError::io("write_stdin", "target/x", io::Error::other("pipe"));
        assert!(matches!(error, EngineError::Io { .. }));
        assert!(error.source().is_some());
        assert!(error.diagnostic().is_none());
    }
}
