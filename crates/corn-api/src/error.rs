//! Listener failures for the archive service.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Result alias for API server operations.
pub type ApiServerResult<T> = Result<T, ApiServerError>;

/// Errors raised while hosting the archive endpoints.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// The listener could not bind the configured `CORN_BIND_ADDR`/`CORN_HTTP_PORT`.
    #[error("failed to bind archive service listener")]
    Bind {
        /// Address attempted.
        addr: SocketAddr,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The accept loop stopped with an IO error.
    #[error("archive service listener stopped")]
    Serve {
        /// Address the listener was bound to.
        addr: SocketAddr,
        /// Underlying IO error.
        source: io::Error,
    },
}
