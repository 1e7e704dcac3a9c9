#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! HTTP surface for the Corn archive service.
//!
//! Layout: `http/router.rs` (router and listener), `http/service.rs` (archive
//! and data handlers), `http/health.rs` (health and metrics), `http/errors.rs`
//! (problem responses), `http/telemetry.rs` (per-route metrics layer).

pub mod error;
pub mod http;
pub mod models;
pub(crate) mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
pub use models::ProblemDetails;
