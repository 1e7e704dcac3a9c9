//! Configuration keys and their fallback values.
//!
//! # Design
//! - Every key is read from the environment first, then from the properties file.
//! - Defaults keep a fresh checkout runnable without any configuration.

/// Root directory under which request workspaces are allocated.
pub const KEY_TARGET: &str = "CORN_TARGET";
/// Toggle for removing workspaces once their archive has been read.
pub const KEY_CLEANUP: &str = "CORN_CLEANUP";
/// Root directory for auxiliary JSON data retrieval.
pub const KEY_DATA: &str = "CORN_DATA";
/// Address the HTTP listener binds to.
pub const KEY_BIND_ADDR: &str = "CORN_BIND_ADDR";
/// Port the HTTP listener binds to.
pub const KEY_HTTP_PORT: &str = "CORN_HTTP_PORT";
/// Program invoked as the generation engine.
pub const KEY_ENGINE: &str = "CORN_ENGINE";
/// Whitespace-separated arguments passed to the engine before the target path.
pub const KEY_ENGINE_ARGS: &str = "CORN_ENGINE_ARGS";
/// Default tracing filter when `RUST_LOG` is unset.
pub const KEY_LOG_LEVEL: &str = "CORN_LOG_LEVEL";
/// Log output format (`json` or `pretty`).
pub const KEY_LOG_FORMAT: &str = "CORN_LOG_FORMAT";
/// Environment variable naming the YAML properties file.
pub const KEY_CONFIG_FILE: &str = "CORN_CONFIG_FILE";

pub(crate) const DEFAULT_TARGET: &str = "target/";
pub(crate) const DEFAULT_CLEANUP: bool = true;
pub(crate) const DEFAULT_DATA: &str = "data/";
pub(crate) const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub(crate) const DEFAULT_HTTP_PORT: u16 = 7070;
pub(crate) const DEFAULT_ENGINE: &str = "corn";
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";
