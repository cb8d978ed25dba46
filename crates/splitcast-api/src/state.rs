//! Application state.

use std::sync::Arc;

use splitcast_pipeline::{
    ArtifactStore, JobExecutor, JobRegistry, MediaEngine, Orchestrator, PipelineConfig,
};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: PipelineConfig,
    pub registry: JobRegistry,
    pub executor: Arc<JobExecutor>,
    pub store: Arc<dyn ArtifactStore>,
}

impl AppState {
    /// Wire up the pipeline behind the HTTP surface.
    ///
    /// The media engine and artifact store are injected so tests can drive
    /// the full job lifecycle without FFmpeg or a bucket.
    pub fn new(
        config: ApiConfig,
        pipeline: PipelineConfig,
        engine: Arc<dyn MediaEngine>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        let registry = JobRegistry::new();
        let orchestrator = Arc::new(Orchestrator::new(
            pipeline.clone(),
            registry.clone(),
            engine,
            store.clone(),
        ));
        let executor = Arc::new(JobExecutor::new(orchestrator, pipeline.max_concurrent_jobs));

        Self {
            config,
            pipeline,
            registry,
            executor,
            store,
        }
    }
}
