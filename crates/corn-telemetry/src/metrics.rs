//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes only the counters the archive pipeline and HTTP surface report.

use std::sync::Arc;

use prometheus::{IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{CounterStep, TelemetryError, TelemetryResult};

const HTTP_REQUESTS: &str = "http_requests_total";
const PIPELINE_STAGES: &str = "pipeline_stages_total";
const PIPELINE_OUTCOMES: &str = "pipeline_outcomes_total";
const ARCHIVE_BYTES: &str = "archive_bytes_total";
const CLEANUP_FAILURES: &str = "cleanup_failures_total";

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    pipeline_stages_total: IntCounterVec,
    pipeline_outcomes_total: IntCounterVec,
    archive_bytes_total: IntCounter,
    cleanup_failures_total: IntCounter,
}

/// Snapshot of selected counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Total bytes of archives returned to callers.
    pub archive_bytes_total: u64,
    /// Total workspaces whose cleanup did not complete.
    pub cleanup_failures_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or
    /// registered.
    pub fn new() -> TelemetryResult<Self> {
        let registry = Registry::new();
        let http_requests_total = counter_vec(
            &registry,
            HTTP_REQUESTS,
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let pipeline_stages_total = counter_vec(
            &registry,
            PIPELINE_STAGES,
            "Archive pipeline stage transitions by stage",
            &["stage"],
        )?;
        let pipeline_outcomes_total = counter_vec(
            &registry,
            PIPELINE_OUTCOMES,
            "Archive pipeline requests by final outcome",
            &["outcome"],
        )?;
        let archive_bytes_total = counter(
            &registry,
            ARCHIVE_BYTES,
            "Bytes of zip archives returned to callers",
        )?;
        let cleanup_failures_total = counter(
            &registry,
            CLEANUP_FAILURES,
            "Workspaces whose cleanup did not complete",
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                pipeline_stages_total,
                pipeline_outcomes_total,
                archive_bytes_total,
                cleanup_failures_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Increment the pipeline stage counter.
    pub fn inc_pipeline_stage(&self, stage: &str) {
        self.inner
            .pipeline_stages_total
            .with_label_values(&[stage])
            .inc();
    }

    /// Increment the pipeline outcome counter.
    pub fn inc_pipeline_outcome(&self, outcome: &str) {
        self.inner
            .pipeline_outcomes_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Add the size of a returned archive.
    pub fn add_archive_bytes(&self, bytes: usize) {
        self.inner
            .archive_bytes_total
            .inc_by(u64::try_from(bytes).unwrap_or(u64::MAX));
    }

    /// Increment the cleanup failure counter.
    pub fn inc_cleanup_failure(&self) {
        self.inner.cleanup_failures_total.inc();
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be encoded.
    pub fn render(&self) -> TelemetryResult<String> {
        TextEncoder::new()
            .encode_to_string(&self.inner.registry.gather())
            .map_err(|source| TelemetryError::Render { source })
    }

    /// Take a point-in-time snapshot of the health-relevant counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            archive_bytes_total: self.inner.archive_bytes_total.get(),
            cleanup_failures_total: self.inner.cleanup_failures_total.get(),
        }
    }

    /// Current count for a pipeline stage label.
    #[must_use]
    pub fn pipeline_stage_count(&self, stage: &str) -> u64 {
        self.inner
            .pipeline_stages_total
            .with_label_values(&[stage])
            .get()
    }

    /// Current count for a pipeline outcome label.
    #[must_use]
    pub fn pipeline_outcome_count(&self, outcome: &str) -> u64 {
        self.inner
            .pipeline_outcomes_total
            .with_label_values(&[outcome])
            .get()
    }
}

fn counter_vec(
    registry: &Registry,
    name: &'static str,
    help: &str,
    labels: &[&str],
) -> TelemetryResult<IntCounterVec> {
    let collector = IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::counter(name, CounterStep::Build, source))?;
    register(registry, name, &collector)?;
    Ok(collector)
}

fn counter(registry: &Registry, name: &'static str, help: &str) -> TelemetryResult<IntCounter> {
    let collector = IntCounter::with_opts(Opts::new(name, help))
        .map_err(|source| TelemetryError::counter(name, CounterStep::Build, source))?;
    register(registry, name, &collector)?;
    Ok(collector)
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> TelemetryResult<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::counter(name, CounterStep::Register, source))
}
