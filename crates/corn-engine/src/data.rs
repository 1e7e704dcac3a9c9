//! File-backed JSON data loader.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::engine::DataLoader;
use crate::error::{EngineError, EngineResult};

/// Reads JSON documents straight from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileLoader;

impl DataLoader for JsonFileLoader {
    fn load_json(&self, path: &Path) -> EngineResult<Value> {
        let raw = fs::read(path).map_err(|source| EngineError::io("load_json.read", path, source))?;
        serde_json::from_slice(&raw).map_err(|source| EngineError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn loads_json_document() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("result.json");
        fs::write(&path, br#"{"files": ["a.txt", "b.txt"]}"#)?;

        let value = JsonFileLoader.load_json(&path)?;
        assert_eq!(value, json!({"files": ["a.txt", "b.txt"]}));
        Ok(())
    }

    #[test]
    fn invalid_json_reports_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.json");
        fs::write(&path, b"{")?;

        match JsonFileLoader.load_json(&path) {
            Err(EngineError::Json { path: reported, .. }) => assert_eq!(reported, path),
            other => anyhow::bail!("unexpected result: {other:?}"),
        }
        Ok(())
    }
}
