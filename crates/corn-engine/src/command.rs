//! Generation engine backed by an external program.
//!
//! # Design
//! - Invocation is `<program> <args...> <target>` with the request JSON on stdin.
//! - Stdin is fed from a helper thread so a chatty engine cannot deadlock on full pipes.
//! - A failing engine may print a JSON diagnostic line on stderr; the last such line wins.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info, warn};

use crate::engine::GenerationEngine;
use crate::error::{EngineError, EngineResult};
use crate::model::{GenerationRequest, ScriptDiagnostic};

/// Runs a configured program as the generation engine.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    /// Construct an engine that runs `program` with `args` before the target path.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Program invoked for each request.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl GenerationEngine for CommandEngine {
    fn execute(&self, request: &GenerationRequest, target: &Path) -> EngineResult<()> {
        let payload = serde_json::to_vec(request).map_err(|source| EngineError::Encode { source })?;

        debug!(
            program = %self.program,
            target = %target.display(),
            "launching generation engine"
        );
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(target)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || match stdin.write_all(&payload) {
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            })
        });

        let output = child
            .wait_with_output()
            .map_err(|source| EngineError::io("command_engine.wait", target, source))?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(source)) => {
                    return Err(EngineError::io("command_engine.write_stdin", target, source));
                }
                Err(_) => {
                    return Err(EngineError::io(
                        "command_engine.write_stdin",
                        target,
                        io::Error::other("stdin writer panicked"),
                    ));
                }
            }
        }

        if output.status.success() {
            info!(
                program = %self.program,
                target = %target.display(),
                "generation engine completed"
            );
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if let Some(diagnostic) = parse_diagnostic(&stderr) {
            return Err(EngineError::Script { diagnostic });
        }

        warn!(
            program = %self.program,
            status = %output.status,
            "generation engine exited without a diagnostic"
        );
        Err(EngineError::Exited {
            program: self.program.clone(),
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        })
    }
}

fn parse_diagnostic(stderr: &str) -> Option<ScriptDiagnostic> {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str::<ScriptDiagnostic>(line).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn parse_diagnostic_picks_last_json_line() {
        let stderr = "warming up\n{\"file\":\"a.corn\",\"line\":1,\"column\":1,\"message\":\"old\"}\n\
                      {\"file\":\"tmpl.corn\",\"line\":12,\"column\":4,\"message\":\"unexpected token\"}\n";
        let diagnostic = parse_diagnostic(stderr);
        assert_eq!(
            diagnostic,
            Some(ScriptDiagnostic {
                file: "tmpl.corn".to_string(),
                line: 12,
                column: 4,
                message: "unexpected token".to_string(),
            })
        );
    }

    #[test]
    fn parse_diagnostic_ignores_plain_text() {
        assert!(parse_diagnostic("boom\n{not json}\n").is_none());
    }

    #[test]
    fn missing_program_reports_launch_failure() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let engine = CommandEngine::new("corn-engine-that-does-not-exist", Vec::new());
        let result = engine.execute(&GenerationRequest::new(json!({})), dir.path());
        assert!(matches!(result, Err(EngineError::Launch { .. })));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn engine_receives_request_and_target() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("workspace");
        let engine = CommandEngine::new(
            "sh",
            vec![
                "-c".to_string(),
                "mkdir -p \"$0\" && cat > \"$0/request.json\"".to_string(),
            ],
        );
        let request = GenerationRequest::new(json!({"name": "orders"}));

        engine.execute(&request, &target)?;

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(target.join("request.json"))?)?;
        assert_eq!(written, json!({"name": "orders"}));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn engine_diagnostic_becomes_script_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let engine = CommandEngine::new(
            "sh",
            vec![
                "-c".to_string(),
                "echo '{\"file\":\"tmpl.corn\",\"line\":12,\"column\":4,\"message\":\"unexpected token\"}' >&2; exit 3"
                    .to_string(),
            ],
        );

        let error = engine
            .execute(&GenerationRequest::new(json!({})), &dir.path().join("w"))
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected engine failure"))?;

        let rendered = error.to_string();
        assert!(matches!(error, EngineError::Script { .. }));
        for part in ["tmpl.corn", "12", "4", "unexpected token"] {
            assert!(rendered.contains(part), "missing {part} in {rendered}");
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn engine_failure_without_diagnostic_keeps_stderr() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let engine = CommandEngine::new(
            "sh",
            vec!["-c".to_string(), "echo 'template missing' >&2; exit 2".to_string()],
        );

        match engine.execute(&GenerationRequest::new(json!({})), &dir.path().join("w")) {
            Err(EngineError::Exited { stderr, .. }) => {
                assert_eq!(stderr, "template missing");
            }
            other => anyhow::bail!("unexpected result: {other:?}"),
        }
        Ok(())
    }
}
