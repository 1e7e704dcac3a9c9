//! Collaborator traits consumed by the archive pipeline.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::error::EngineResult;
use crate::model::GenerationRequest;

/// External engine that materialises a request into a workspace directory.
///
/// On success the `target` directory and its files exist on disk, written
/// entirely by the engine. Producing nothing is also a success.
pub trait GenerationEngine: Send + Sync {
    /// Run the engine for `request`, writing into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Script`] when the engine reports a
    /// positioned diagnostic, or another variant when it cannot run.
    fn execute(&self, request: &GenerationRequest, target: &Path) -> EngineResult<()>;
}

impl<T: GenerationEngine + ?Sized> GenerationEngine for Arc<T> {
    fn execute(&self, request: &GenerationRequest, target: &Path) -> EngineResult<()> {
        (**self).execute(request, target)
    }
}

/// Loader for auxiliary JSON data exposed next to the archives.
pub trait DataLoader: Send + Sync {
    /// Load and parse the JSON document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    fn load_json(&self, path: &Path) -> EngineResult<Value>;
}

impl<T: DataLoader + ?Sized> DataLoader for Arc<T> {
    fn load_json(&self, path: &Path) -> EngineResult<Value> {
        (**self).load_json(path)
    }
}
