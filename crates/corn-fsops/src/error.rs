//! # Design
//!
//! - Provide structured, constant-message errors for the archive pipeline.
//! - Capture operation context (paths, fields, inputs) to make failures reproducible in tests.
//! - Generation failures render the engine diagnostic; losing it would hide the script error.

use std::io;
use std::path::PathBuf;

use corn_engine::EngineError;
use thiserror::Error;

use crate::model::CleanupFailure;

/// Result type for pipeline operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced by the workspace and archive pipeline.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Walkdir traversal failures.
    #[error("fsops walkdir failure")]
    Walkdir {
        /// Operation that triggered the walkdir failure.
        operation: &'static str,
        /// Path involved in the walkdir failure.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
    /// Zip archive failures.
    #[error("fsops zip failure")]
    Zip {
        /// Operation that triggered the archive failure.
        operation: &'static str,
        /// Path involved in the archive failure.
        path: PathBuf,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },
    /// The generation engine failed for a request.
    #[error("generation engine failed: {source}")]
    Generation {
        /// Workspace the engine was writing into.
        workspace: PathBuf,
        /// Underlying engine error.
        source: EngineError,
    },
    /// Auxiliary data could not be loaded.
    #[error("fsops data load failure")]
    Data {
        /// Data file path.
        path: PathBuf,
        /// Underlying engine error.
        source: EngineError,
    },
    /// Input validation failures.
    #[error("fsops invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// One or more workspace entries could not be removed.
    #[error("fsops cleanup incomplete")]
    Cleanup {
        /// Workspace root being removed.
        path: PathBuf,
        /// Every entry that failed, in traversal order.
        failures: Vec<CleanupFailure>,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn walkdir(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: walkdir::Error,
    ) -> Self {
        Self::Walkdir {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: zip::result::ZipError,
    ) -> Self {
        Self::Zip {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Path involved in the failure, when the variant carries one.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. }
            | Self::Walkdir { path, .. }
            | Self::Zip { path, .. }
            | Self::Data { path, .. }
            | Self::Cleanup { path, .. } => Some(path),
            Self::Generation { workspace, .. } => Some(workspace),
            Self::InvalidInput { .. } => None,
        }
    }
}
