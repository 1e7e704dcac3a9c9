//! Fake generation engines.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use corn_engine::{EngineError, EngineResult, GenerationEngine, GenerationRequest, ScriptDiagnostic};

use crate::fixtures::write_file;

#[derive(Debug, Clone)]
struct PlannedFile {
    relative: PathBuf,
    contents: Vec<u8>,
    modified: SystemTime,
}

/// Engine that writes a fixed set of files into the target workspace.
#[derive(Debug, Clone, Default)]
pub struct WritingEngine {
    files: Vec<PlannedFile>,
    targets: Arc<Mutex<Vec<PathBuf>>>,
}

impl WritingEngine {
    /// Engine that creates the workspace but writes no files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, relative to the workspace, with a pinned modification time.
    #[must_use]
    pub fn with_file(
        mut self,
        relative: impl Into<PathBuf>,
        contents: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) -> Self {
        self.files.push(PlannedFile {
            relative: relative.into(),
            contents: contents.into(),
            modified,
        });
        self
    }

    /// Workspaces this engine has been asked to write, in call order.
    #[must_use]
    pub fn targets(&self) -> Vec<PathBuf> {
        self.targets
            .lock()
            .map(|targets| targets.clone())
            .unwrap_or_default()
    }
}

impl GenerationEngine for WritingEngine {
    fn execute(&self, _request: &GenerationRequest, target: &Path) -> EngineResult<()> {
        if let Ok(mut targets) = self.targets.lock() {
            targets.push(target.to_path_buf());
        }
        std::fs::create_dir_all(target).map_err(|source| EngineError::Io {
            operation: "writing_engine.create_dir",
            path: target.to_path_buf(),
            source,
        })?;
        for file in &self.files {
            let path = target.join(&file.relative);
            write_file(&path, &file.contents, file.modified).map_err(|source| {
                EngineError::Io {
                    operation: "writing_engine.write_file",
                    path: path.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}

/// Engine that succeeds without creating the workspace.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentEngine;

impl GenerationEngine for SilentEngine {
    fn execute(&self, _request: &GenerationRequest, _target: &Path) -> EngineResult<()> {
        Ok(())
    }
}

/// Engine that always fails with a script diagnostic.
#[derive(Debug, Clone)]
pub struct FailingEngine {
    diagnostic: ScriptDiagnostic,
}

impl FailingEngine {
    /// Engine failing at `file:line:column` with `message`.
    #[must_use]
    pub fn new(file: &str, line: u32, column: u32, message: &str) -> Self {
        Self {
            diagnostic: ScriptDiagnostic {
                file: file.to_string(),
                line,
                column,
                message: message.to_string(),
            },
        }
    }
}

impl GenerationEngine for FailingEngine {
    fn execute(&self, _request: &GenerationRequest, _target: &Path) -> EngineResult<()> {
        Err(EngineError::Script {
            diagnostic: self.diagnostic.clone(),
        })
    }
}
