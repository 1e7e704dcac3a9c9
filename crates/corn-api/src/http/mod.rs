//! HTTP surface modules (router, handlers, middleware).

/// Shared constants and header names for HTTP surfaces.
pub mod constants;
/// Problem response helpers and error types.
pub mod errors;
/// Health and metrics endpoints.
pub mod health;
/// Router construction and server host.
pub mod router;
/// Archive and data handlers.
pub mod service;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
