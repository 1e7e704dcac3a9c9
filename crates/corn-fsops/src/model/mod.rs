//! Domain models for the archive pipeline.
//!
//! # Design
//! - Keep pipeline results plain data so transports can map them freely.
//! - A workspace is identified by its token; the path is derived from the root.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Per-request directory the engine writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    token: Uuid,
    path: PathBuf,
}

impl Workspace {
    pub(crate) const fn new(token: Uuid, path: PathBuf) -> Self {
        Self { token, path }
    }

    /// Unique token identifying the workspace.
    #[must_use]
    pub const fn token(&self) -> Uuid {
        self.token
    }

    /// Directory path of the workspace.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Stages a request passes through; none are persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    /// Workspace path computed.
    Allocated,
    /// Engine finished without error.
    Generated,
    /// Archive written and read back.
    Archived,
    /// Cleanup attempted on the workspace.
    Cleaned,
    /// Cleanup disabled by configuration.
    CleanupSkipped,
    /// Request finished with a result.
    Done,
    /// Request aborted by a generation or archiving failure.
    Errored,
}

impl PipelineStage {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allocated => "allocated",
            Self::Generated => "generated",
            Self::Archived => "archived",
            Self::Cleaned => "cleaned",
            Self::CleanupSkipped => "cleanup_skipped",
            Self::Done => "done",
            Self::Errored => "errored",
        }
    }
}

/// What a successful request hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Zip archive bytes of the workspace.
    Archive {
        /// Complete zip archive.
        bytes: Vec<u8>,
        /// Number of entries written.
        entries: usize,
    },
    /// Generation succeeded but no workspace exists.
    NoContent,
}

impl PipelineOutcome {
    /// Archive bytes, if any were produced.
    #[must_use]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Archive { bytes, .. } => Some(bytes),
            Self::NoContent => None,
        }
    }
}

/// Result of the post-archive housekeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupStatus {
    /// Workspace removed completely.
    Removed {
        /// Regular files (and links) removed.
        files: usize,
        /// Directories removed, including the workspace itself.
        directories: usize,
    },
    /// Some entries could not be removed.
    Incomplete {
        /// Number of entries that failed.
        failures: usize,
    },
    /// Cleanup disabled by configuration.
    Skipped,
    /// The pipeline ended before cleanup was considered.
    NotAttempted,
}

/// Full account of one request.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Workspace allocated for the request.
    pub workspace: Workspace,
    /// Result returned to the caller.
    pub outcome: PipelineOutcome,
    /// Stages entered, in order.
    pub stages: Vec<PipelineStage>,
    /// Housekeeping result.
    pub cleanup: CleanupStatus,
}

/// Entries removed by a successful cleanup, in removal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Removed paths; children always precede their parent directory.
    pub removed: Vec<PathBuf>,
    /// Count of non-directory entries removed.
    pub files: usize,
    /// Count of directories removed.
    pub directories: usize,
}

/// A workspace entry that could not be removed.
#[derive(Debug)]
pub struct CleanupFailure {
    /// Entry that failed.
    pub path: PathBuf,
    /// Underlying IO error.
    pub source: io::Error,
}
