//! Failures while wiring the log subscriber and the service counters.

use prometheus::Error as PrometheusError;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

use crate::init::LogFormat;

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Step at which a counter could not be set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterStep {
    /// The collector rejected its name, help text or labels.
    Build,
    /// The registry already holds a collector with the same descriptor.
    Register,
}

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The global log subscriber could not be installed.
    #[error("failed to install log subscriber")]
    Logging {
        /// Output format that was requested.
        format: LogFormat,
        /// Underlying subscriber error.
        source: TryInitError,
    },
    /// A pipeline or HTTP counter could not be set up.
    #[error("failed to set up counter")]
    Counter {
        /// Counter name.
        name: &'static str,
        /// Step that failed.
        step: CounterStep,
        /// Underlying Prometheus error.
        source: PrometheusError,
    },
    /// The registry could not be rendered in the text exposition format.
    #[error("failed to render metrics")]
    Render {
        /// Underlying Prometheus error.
        source: PrometheusError,
    },
}

impl TelemetryError {
    pub(crate) const fn counter(
        name: &'static str,
        step: CounterStep,
        source: PrometheusError,
    ) -> Self {
        Self::Counter { name, step, source }
    }
}
