//! Workspace allocation and removal.
//!
//! # Design
//! - Allocation only computes a path; the engine creates the directory.
//! - Removal is post-order and best effort: every entry is attempted, and
//!   failures are collected instead of aborting the walk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};
use crate::model::{CleanupFailure, CleanupReport, Workspace};

/// Allocates per-request workspaces under a root directory.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    /// Manager rooted at `root`. The root does not need to exist yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory workspaces are allocated under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute a fresh workspace path. Nothing is created on disk.
    #[must_use]
    pub fn allocate(&self) -> Workspace {
        let token = Uuid::new_v4();
        let path = self.root.join(token.to_string());
        debug!(workspace = %path.display(), "allocated workspace");
        Workspace::new(token, path)
    }

    /// Whether the workspace directory currently exists.
    #[must_use]
    pub fn exists(workspace: &Workspace) -> bool {
        workspace.path().exists()
    }

    /// Remove the workspace and everything beneath it, children first.
    ///
    /// A missing workspace is treated as already clean.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Cleanup`] listing every entry that could not be
    /// traversed or removed. Entries that could be removed are gone.
    pub fn cleanup(workspace: &Workspace) -> FsOpsResult<CleanupReport> {
        remove_tree(workspace.path())
    }
}

pub(crate) fn remove_tree(root: &Path) -> FsOpsResult<CleanupReport> {
    let mut report = CleanupReport::default();
    if !root.exists() {
        return Ok(report);
    }

    let mut failures = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                warn!(path = %path.display(), error = %err, "failed to traverse workspace entry");
                failures.push(CleanupFailure {
                    path,
                    source: err.into(),
                });
                continue;
            }
        };

        let path = entry.path();
        let is_dir = entry.file_type().is_dir();
        let removal = if is_dir {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        match removal {
            Ok(()) => {
                if is_dir {
                    report.directories += 1;
                } else {
                    report.files += 1;
                }
                report.removed.push(path.to_path_buf());
            }
            Err(source) => {
                warn!(path = %path.display(), error = %source, "failed to remove workspace entry");
                failures.push(CleanupFailure {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    if failures.is_empty() {
        debug!(
            workspace = %root.display(),
            files = report.files,
            directories = report.directories,
            "workspace removed"
        );
        Ok(report)
    } else {
        Err(FsOpsError::Cleanup {
            path: root.to_path_buf(),
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use corn_test_support::fixtures::{fixed_time, temp_dir, write_file};

    #[test]
    fn allocate_joins_root_with_uuid_token() -> Result<()> {
        let dir = temp_dir("corn-workspace-")?;
        let manager = WorkspaceManager::new(dir.path());

        let first = manager.allocate();
        let second = manager.allocate();

        assert_ne!(first.token(), second.token());
        assert_eq!(first.path(), dir.path().join(first.token().to_string()));
        assert!(!WorkspaceManager::exists(&first));
        Ok(())
    }

    #[test]
    fn cleanup_removes_children_before_parents() -> Result<()> {
        let dir = temp_dir("corn-workspace-")?;
        let manager = WorkspaceManager::new(dir.path());
        let workspace = manager.allocate();
        let when = fixed_time(1_700_000_000);
        write_file(&workspace.path().join("a.txt"), b"A", when)?;
        write_file(&workspace.path().join("nested").join("deep").join("b.txt"), b"B", when)?;

        let report = WorkspaceManager::cleanup(&workspace)?;

        assert!(!WorkspaceManager::exists(&workspace));
        assert_eq!(report.files, 2);
        assert_eq!(report.directories, 3);
        for (index, removed) in report.removed.iter().enumerate() {
            let parent_index = report
                .removed
                .iter()
                .position(|candidate| Some(candidate.as_path()) == removed.parent());
            if let Some(parent_index) = parent_index {
                assert!(index < parent_index, "{} removed after its parent", removed.display());
            }
        }
        assert_eq!(report.removed.last(), Some(&workspace.path().to_path_buf()));
        Ok(())
    }

    #[test]
    fn cleanup_of_missing_workspace_is_noop() -> Result<()> {
        let dir = temp_dir("corn-workspace-")?;
        let workspace = WorkspaceManager::new(dir.path()).allocate();

        let report = WorkspaceManager::cleanup(&workspace)?;

        assert!(report.removed.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn cleanup_continues_past_failures() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = temp_dir("corn-workspace-")?;
        let workspace = WorkspaceManager::new(dir.path()).allocate();
        let when = fixed_time(1_700_000_000);
        let locked = workspace.path().join("locked");
        write_file(&locked.join("inner.txt"), b"x", when)?;
        write_file(&workspace.path().join("free.txt"), b"y", when)?;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555))?;

        // Privileged users bypass directory permissions.
        if fs::remove_file(locked.join("inner.txt")).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
            return Ok(());
        }

        let result = WorkspaceManager::cleanup(&workspace);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

        match result {
            Err(FsOpsError::Cleanup { failures, .. }) => {
                assert!(!failures.is_empty());
                assert!(!workspace.path().join("free.txt").exists());
            }
            other => anyhow::bail!("expected cleanup failure, got {other:?}"),
        }
        Ok(())
    }
}
