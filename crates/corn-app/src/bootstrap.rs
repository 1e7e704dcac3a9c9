use std::fs;
use std::sync::Arc;

use corn_api::ApiServer;
use corn_config::defaults::{KEY_LOG_FORMAT, KEY_LOG_LEVEL};
use corn_config::{ConfigSources, CornConfig};
use corn_engine::{CommandEngine, GenerationEngine};
use corn_fsops::{PipelineService, PipelineSettings};
use corn_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, Metrics, ServiceSpanGuard};
use tracing::info;

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap the Corn service.
pub(crate) struct BootstrapDependencies {
    sources: ConfigSources,
    telemetry: Metrics,
    engine: Option<Arc<dyn GenerationEngine>>,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let sources = ConfigSources::from_process_env()
            .map_err(|err| AppError::config("config.sources", err))?;
        Self::from_sources(sources)
    }

    pub(crate) fn from_sources(sources: ConfigSources) -> AppResult<Self> {
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self {
            sources,
            telemetry,
            engine: None,
        })
    }

    /// Replace the process-backed engine, mainly for tests.
    #[cfg(test)]
    pub(crate) fn with_engine(mut self, engine: Arc<dyn GenerationEngine>) -> Self {
        self.engine = Some(engine);
        self
    }
}

/// Entry point for the Corn service boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, logging or the HTTP listener fail.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify testing.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let level = dependencies
        .sources
        .value(KEY_LOG_LEVEL)
        .unwrap_or(DEFAULT_LOG_LEVEL);
    let logging = LoggingConfig {
        level,
        format: LogFormat::from_setting(dependencies.sources.value(KEY_LOG_FORMAT)),
        ..LoggingConfig::default()
    };
    corn_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    let (config, api) = prepare(dependencies)?;
    let _span = ServiceSpanGuard::enter(&config.target_root);
    let addr = config.socket_addr();
    info!(addr = %addr, "launching api listener");
    api.serve(addr)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))
}

/// Resolve configuration and build the HTTP server without binding it.
pub(crate) fn prepare(dependencies: BootstrapDependencies) -> AppResult<(CornConfig, ApiServer)> {
    let BootstrapDependencies {
        sources,
        telemetry,
        engine,
    } = dependencies;

    let config = corn_config::load(&sources).map_err(|err| AppError::config("config.load", err))?;
    fs::create_dir_all(&config.target_root)
        .map_err(|err| AppError::io("bootstrap.create_target_root", &config.target_root, err))?;

    let engine = engine.unwrap_or_else(|| {
        Arc::new(CommandEngine::new(
            config.engine.program.clone(),
            config.engine.args.clone(),
        ))
    });
    info!(
        target_root = %config.target_root.display(),
        data_root = %config.data_root.display(),
        cleanup = config.cleanup,
        engine = %config.engine.program,
        "corn service bootstrap starting"
    );

    let pipeline = PipelineService::new(engine, telemetry.clone(), PipelineSettings::from(&config));
    let api = ApiServer::new(pipeline, telemetry);
    Ok((config, api))
}
