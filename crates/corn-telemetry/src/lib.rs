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

//! Telemetry primitives shared across the Corn workspace.
//!
//! This crate centralises logging, metrics, and request tracing helpers so the
//! pipeline and the HTTP surface report through the same subscriber and registry.
//!
//! Layout: `init.rs` (subscriber install), `context.rs` (service, request and
//! pipeline spans), `metrics.rs` (Prometheus counters).

pub mod context;
pub mod error;
pub mod init;
pub mod metrics;

pub use context::{ServiceSpanGuard, current_request_id, pipeline_span, with_request_context};
pub use error::{CounterStep, TelemetryError, TelemetryResult};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use metrics::{Metrics, MetricsSnapshot};
