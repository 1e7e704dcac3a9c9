#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Workspace lifecycle and archiving pipeline.
//!
//! Layout: `workspace.rs` (allocation and cleanup), `archive.rs` (directory to
//! zip), `service.rs` (request orchestration), `model/` (pipeline types).

pub mod archive;
pub mod error;
pub mod model;
pub mod service;
pub mod workspace;

pub use archive::{ARCHIVE_COMMENT, ArchiveFile, DirectoryArchiver, zip_timestamp};
pub use error::{FsOpsError, FsOpsResult};
pub use model::{
    CleanupFailure, CleanupReport, CleanupStatus, PipelineOutcome, PipelineReport, PipelineStage,
    Workspace,
};
pub use service::{PipelineService, PipelineSettings};
pub use workspace::WorkspaceManager;
