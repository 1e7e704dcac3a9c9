//! Request payload and engine diagnostics.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque generation request; the schema belongs to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationRequest(Value);

impl GenerationRequest {
    /// Wrap a JSON payload.
    #[must_use]
    pub const fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// Borrow the raw payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for GenerationRequest {
    fn from(payload: Value) -> Self {
        Self(payload)
    }
}

/// Source position reported by the engine when a script fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptDiagnostic {
    /// Script or template identifier.
    pub file: String,
    /// One-based line number.
    pub line: u32,
    /// One-based column number.
    pub column: u32,
    /// Engine message.
    pub message: String,
}

impl Display for ScriptDiagnostic {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "script file: {}, line: {}, column: {}, message: {}",
            self.file, self.line, self.column, self.message
        )
    }
}
