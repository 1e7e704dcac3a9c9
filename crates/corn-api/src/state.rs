//! Shared handler state.

use corn_fsops::PipelineService;
use corn_telemetry::Metrics;

pub(crate) struct ApiState {
    pub(crate) pipeline: PipelineService,
    pub(crate) telemetry: Metrics,
}

impl ApiState {
    pub(crate) const fn new(pipeline: PipelineService, telemetry: Metrics) -> Self {
        Self {
            pipeline,
            telemetry,
        }
    }
}
