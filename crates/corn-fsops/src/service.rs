//! Request orchestration: allocate, generate, archive, clean up.
//!
//! # Design
//! - Each request runs the stage machine once, synchronously, top to bottom.
//! - Generation and archiving failures abort the request; the workspace is
//!   left on disk for inspection.
//! - Cleanup runs only after the archive bytes are in memory and never changes
//!   the result handed back to the caller.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use corn_config::CornConfig;
use corn_engine::{DataLoader, GenerationEngine, GenerationRequest, JsonFileLoader};
use corn_telemetry::Metrics;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::archive::DirectoryArchiver;
use crate::error::{FsOpsError, FsOpsResult};
use crate::model::{CleanupStatus, PipelineOutcome, PipelineReport, PipelineStage, Workspace};
use crate::workspace::WorkspaceManager;

/// Settings the pipeline needs from the process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Root under which workspaces are allocated.
    pub target_root: PathBuf,
    /// Root for auxiliary JSON data.
    pub data_root: PathBuf,
    /// Remove workspaces after a successful archive.
    pub cleanup: bool,
}

impl From<&CornConfig> for PipelineSettings {
    fn from(config: &CornConfig) -> Self {
        Self {
            target_root: config.target_root.clone(),
            data_root: config.data_root.clone(),
            cleanup: config.cleanup,
        }
    }
}

/// Orchestrates the archive pipeline for generation requests.
#[derive(Clone)]
pub struct PipelineService {
    workspaces: WorkspaceManager,
    engine: Arc<dyn GenerationEngine>,
    data_loader: Arc<dyn DataLoader>,
    archiver: DirectoryArchiver,
    metrics: Metrics,
    settings: PipelineSettings,
}

impl PipelineService {
    /// Construct the service around a generation engine.
    #[must_use]
    pub fn new(
        engine: Arc<dyn GenerationEngine>,
        metrics: Metrics,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            workspaces: WorkspaceManager::new(settings.target_root.clone()),
            engine,
            data_loader: Arc::new(JsonFileLoader),
            archiver: DirectoryArchiver::new(),
            metrics,
            settings,
        }
    }

    /// Replace the auxiliary data loader.
    #[must_use]
    pub fn with_data_loader(mut self, loader: Arc<dyn DataLoader>) -> Self {
        self.data_loader = loader;
        self
    }

    /// Replace the archiver, e.g. to pin its temp directory.
    #[must_use]
    pub fn with_archiver(mut self, archiver: DirectoryArchiver) -> Self {
        self.archiver = archiver;
        self
    }

    /// Settings the service was built with.
    #[must_use]
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run a generation request and return the archived workspace.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Generation`] when the engine fails, or an archive
    /// error when the workspace cannot be zipped. Cleanup failures are logged
    /// and reported in [`PipelineReport::cleanup`] instead.
    pub fn create_zip(&self, request: &GenerationRequest) -> FsOpsResult<PipelineReport> {
        let mut stages = Vec::with_capacity(5);
        let workspace = self.workspaces.allocate();
        self.enter(&mut stages, PipelineStage::Allocated, &workspace);

        if let Err(source) = self.engine.execute(request, workspace.path()) {
            error!(
                workspace = %workspace.path().display(),
                error = %source,
                "generation engine failed"
            );
            self.enter(&mut stages, PipelineStage::Errored, &workspace);
            self.metrics.inc_pipeline_outcome("generation_failed");
            return Err(FsOpsError::Generation {
                workspace: workspace.path().to_path_buf(),
                source,
            });
        }
        self.enter(&mut stages, PipelineStage::Generated, &workspace);

        if !WorkspaceManager::exists(&workspace) {
            info!(workspace = %workspace.path().display(), "generation produced no workspace");
            self.enter(&mut stages, PipelineStage::Done, &workspace);
            self.metrics.inc_pipeline_outcome("no_content");
            return Ok(PipelineReport {
                workspace,
                outcome: PipelineOutcome::NoContent,
                stages,
                cleanup: CleanupStatus::NotAttempted,
            });
        }

        let archived = self
            .archiver
            .archive(workspace.path())
            .and_then(|archive| Ok((archive.read_bytes()?, archive.entries())));
        let (bytes, entries) = match archived {
            Ok(archived) => archived,
            Err(err) => {
                error!(
                    workspace = %workspace.path().display(),
                    error = %err,
                    path = ?err.path(),
                    "failed to archive workspace"
                );
                self.enter(&mut stages, PipelineStage::Errored, &workspace);
                self.metrics.inc_pipeline_outcome("archive_failed");
                return Err(err);
            }
        };
        self.enter(&mut stages, PipelineStage::Archived, &workspace);

        let cleanup = if self.settings.cleanup {
            let status = self.cleanup(&workspace);
            self.enter(&mut stages, PipelineStage::Cleaned, &workspace);
            status
        } else {
            self.enter(&mut stages, PipelineStage::CleanupSkipped, &workspace);
            CleanupStatus::Skipped
        };

        self.enter(&mut stages, PipelineStage::Done, &workspace);
        self.metrics.inc_pipeline_outcome("archive");
        self.metrics.add_archive_bytes(bytes.len());
        info!(
            workspace = %workspace.path().display(),
            entries,
            bytes = bytes.len(),
            "workspace archived"
        );
        Ok(PipelineReport {
            workspace,
            outcome: PipelineOutcome::Archive { bytes, entries },
            stages,
            cleanup,
        })
    }

    /// Load an auxiliary JSON document relative to the data root.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::InvalidInput`] for empty, absolute or escaping
    /// paths and [`FsOpsError::Data`] when the file cannot be parsed.
    pub fn load_data(&self, relative: &str) -> FsOpsResult<Option<Value>> {
        let relative = sanitize_data_path(relative)?;
        let path = self.settings.data_root.join(&relative);
        if !path.is_file() {
            warn!(path = %path.display(), "data file not found");
            return Ok(None);
        }
        let value = self
            .data_loader
            .load_json(&path)
            .map_err(|source| FsOpsError::Data {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "data file loaded");
        Ok(Some(value))
    }

    fn cleanup(&self, workspace: &Workspace) -> CleanupStatus {
        match WorkspaceManager::cleanup(workspace) {
            Ok(report) => CleanupStatus::Removed {
                files: report.files,
                directories: report.directories,
            },
            Err(err) => {
                let failures = match &err {
                    FsOpsError::Cleanup { failures, .. } => failures.len(),
                    _ => 1,
                };
                error!(
                    workspace = %workspace.path().display(),
                    failures,
                    error = %err,
                    "workspace cleanup incomplete"
                );
                self.metrics.inc_cleanup_failure();
                CleanupStatus::Incomplete { failures }
            }
        }
    }

    fn enter(&self, stages: &mut Vec<PipelineStage>, stage: PipelineStage, workspace: &Workspace) {
        debug!(
            stage = stage.as_str(),
            workspace = %workspace.path().display(),
            "pipeline stage"
        );
        self.metrics.inc_pipeline_stage(stage.as_str());
        stages.push(stage);
    }
}

fn sanitize_data_path(raw: &str) -> FsOpsResult<PathBuf> {
    let path = Path::new(raw);
    if path.is_absolute() {
        return Err(FsOpsError::InvalidInput {
            field: "data_path",
            reason: "absolute_path",
            value: Some(raw.to_string()),
        });
    }

    let mut sanitized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => sanitized.push(part),
            Component::CurDir => {}
            _ => {
                return Err(FsOpsError::InvalidInput {
                    field: "data_path",
                    reason: "invalid_segment",
                    value: Some(raw.to_string()),
                });
            }
        }
    }

    if sanitized.as_os_str().is_empty() {
        return Err(FsOpsError::InvalidInput {
            field: "data_path",
            reason: "empty_path",
            value: Some(raw.to_string()),
        });
    }
    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_data_path_normalises_relative_segments() -> FsOpsResult<()> {
        assert_eq!(
            sanitize_data_path("nested/./file.json")?,
            PathBuf::from("nested/file.json")
        );
        Ok(())
    }

    #[test]
    fn sanitize_data_path_rejects_escapes() {
        for (raw, reason) in [
            ("/etc/passwd", "absolute_path"),
            ("../secret.json", "invalid_segment"),
            ("nested/../../x.json", "invalid_segment"),
            ("", "empty_path"),
            ("./", "empty_path"),
        ] {
            match sanitize_data_path(raw) {
                Err(FsOpsError::InvalidInput { reason: actual, .. }) => {
                    assert_eq!(actual, reason, "unexpected reason for {raw:?}");
                }
                other => panic!("expected invalid input for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn settings_follow_config() {
        let config = CornConfig {
            target_root: PathBuf::from("target/"),
            cleanup: false,
            data_root: PathBuf::from("data/"),
            bind_addr: std::net::IpAddr::from([127, 0, 0, 1]),
            http_port: 7070,
            engine: corn_config::EngineCommand {
                program: "corn".to_string(),
                args: Vec::new(),
            },
            log_level: "info".to_string(),
            log_format: None,
        };
        let settings = PipelineSettings::from(&config);
        assert_eq!(settings.target_root, PathBuf::from("target/"));
        assert_eq!(settings.data_root, PathBuf::from("data/"));
        assert!(!settings.cleanup);
    }
}
