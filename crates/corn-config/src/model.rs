//! Typed configuration resolved once at process start.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Immutable configuration snapshot injected into the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CornConfig {
    /// Root directory under which workspaces are allocated.
    pub target_root: PathBuf,
    /// Whether workspaces are removed after a successful archive read.
    pub cleanup: bool,
    /// Root directory for auxiliary JSON data retrieval.
    pub data_root: PathBuf,
    /// HTTP listener address.
    pub bind_addr: IpAddr,
    /// HTTP listener port.
    pub http_port: u16,
    /// Generation engine invocation.
    pub engine: EngineCommand,
    /// Default log filter directive.
    pub log_level: String,
    /// Requested log format, when configured.
    pub log_format: Option<String>,
}

impl CornConfig {
    /// Socket address the HTTP listener should bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

/// External program used as the generation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    /// Program name or path.
    pub program: String,
    /// Arguments placed before the target workspace path.
    pub args: Vec<String>,
}
