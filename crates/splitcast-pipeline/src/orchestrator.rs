//! Job orchestration.
//!
//! Drives one job through its whole lifecycle: download the source, plan the
//! windows, fan the segment tasks out across a bounded worker pool, then
//! publish the rendered segments in index order. Segment failures never abort
//! the job; only producing nothing at all does.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::warn;

use splitcast_models::{artifact_file_name, Job, JobId, JobResult, JobState, TaskStatus};
use splitcast_storage::StorageError;

use crate::capabilities::{ArtifactStore, MediaEngine};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::JobLogger;
use crate::planner::plan_segments;
use crate::registry::JobRegistry;
use crate::retry::{RetryOutcome, RetryPolicy};
use crate::worker::process_segment;
use crate::workdir::JobWorkspace;

/// Drives jobs to a terminal state.
pub struct Orchestrator {
    config: PipelineConfig,
    registry: JobRegistry,
    engine: Arc<dyn MediaEngine>,
    store: Arc<dyn ArtifactStore>,
}

impl Orchestrator {
    pub fn new(
        config: PipelineConfig,
        registry: JobRegistry,
        engine: Arc<dyn MediaEngine>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            config,
            registry,
            engine,
            store,
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Run one job to completion or failure.
    ///
    /// The workspace is torn down on every exit path; the job's terminal
    /// state is recorded in the registry before this returns.
    pub async fn run_job(&self, job_id: &JobId) {
        let Some(job) = self.registry.get(job_id).await else {
            warn!(job_id = %job_id, "Job vanished before execution");
            return;
        };

        let logger = JobLogger::new(&job.id, "segmentation");
        logger.log_start(&format!("source {}", job.source_url));

        let workspace = match JobWorkspace::create(&self.config.work_dir, &job.id).await {
            Ok(workspace) => workspace,
            Err(e) => {
                self.fail(job_id, &logger, format!("Failed to create workspace: {}", e))
                    .await;
                return;
            }
        };

        let outcome = self.execute(&job, &workspace, &logger).await;

        if let Err(e) = workspace.cleanup().await {
            logger.log_warning(&format!("Workspace cleanup failed: {}", e));
        }

        match outcome {
            Ok(result) => {
                logger.log_completion(&format!(
                    "{} published, {} failed",
                    result.manifest.len(),
                    result.failed_indices.len()
                ));
                self.registry.update(job_id, |j| j.complete(result)).await;
            }
            Err(e) => {
                self.fail(job_id, &logger, e.to_string()).await;
            }
        }
    }

    /// Execute the non-terminal stages. Returns the terminal manifest or the
    /// job-fatal error.
    async fn execute(
        &self,
        job: &Job,
        workspace: &JobWorkspace,
        logger: &JobLogger,
    ) -> PipelineResult<JobResult> {
        let policy = RetryPolicy::new(job.config.max_retry_attempts)
            .with_base_delay(self.config.retry_base_delay)
            .with_max_delay(self.config.retry_max_delay);

        // Download
        self.advance(&job.id, JobState::Downloading).await;
        logger.log_progress("Downloading source video");

        let source_path = workspace.source_path();
        let downloaded = match policy
            .run("download", || {
                let url = job.source_url.clone();
                let dest = source_path.clone();
                async move { self.engine.download(&url, &dest).await }
            })
            .await
        {
            RetryOutcome::Success { value, .. } => value,
            RetryOutcome::Failed { error, attempts } => {
                return Err(PipelineError::job_failed(format!(
                    "Download failed after {} attempt(s): {}",
                    attempts, error
                )));
            }
        };

        // Plan
        self.advance(&job.id, JobState::Planning).await;

        let tasks = plan_segments(downloaded.duration_secs, &job.config)
            .map_err(|e| PipelineError::job_failed(format!("Planning failed: {}", e)))?;
        let total = tasks.len();
        logger.log_progress(&format!(
            "Planned {} segments over {:.1}s of video",
            total, downloaded.duration_secs
        ));

        // Process
        self.advance(&job.id, JobState::Processing).await;

        let semaphore = Arc::new(Semaphore::new(job.config.max_parallel_workers));
        let last_index = total - 1;
        let policy = &policy;

        let futures: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let semaphore = semaphore.clone();
                let source = downloaded.path.clone();
                let is_final = task.index() == last_index;

                async move {
                    let _permit = semaphore.acquire().await.expect("semaphore closed");
                    process_segment(
                        self.engine.as_ref(),
                        policy,
                        workspace,
                        &source,
                        &job.config.overlay,
                        &job.title,
                        task,
                        is_final,
                    )
                    .await
                }
            })
            .collect();

        let mut results = join_all(futures).await;
        results.sort_by_key(|t| t.index());

        let mut failed_indices: Vec<usize> = results
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .map(|t| t.index())
            .collect();
        let succeeded: Vec<_> = results
            .into_iter()
            .filter(|t| t.status == TaskStatus::Succeeded)
            .collect();

        logger.log_progress(&format!("{} of {} segments rendered", succeeded.len(), total));

        if succeeded.is_empty() {
            return Err(PipelineError::job_failed(format!(
                "All {} segment(s) failed to render",
                total
            )));
        }

        // Publish, strictly in index order
        self.advance(&job.id, JobState::Uploading).await;

        let upload_timeout = Duration::from_secs(self.config.upload_timeout_secs);
        let mut result = JobResult::default();

        for task in &succeeded {
            let output = task
                .output
                .clone()
                .expect("succeeded task carries an artifact path");
            let key = format!(
                "videos/{}/{}",
                job.id,
                artifact_file_name(&job.title, task.index())
            );

            let outcome = policy
                .run(&format!("upload segment {}", task.index()), || {
                    let output = output.clone();
                    let key = key.clone();
                    async move {
                        match tokio::time::timeout(
                            upload_timeout,
                            self.store.put(&output, &key, "video/mp4"),
                        )
                        .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(StorageError::upload_failed(format!(
                                "Upload timed out after {}s",
                                upload_timeout.as_secs()
                            ))),
                        }
                    }
                })
                .await;

            match outcome {
                RetryOutcome::Success { value: url, .. } => {
                    result.manifest.insert(task.index(), url);
                }
                RetryOutcome::Failed { error, .. } => {
                    logger.log_warning(&format!(
                        "Upload of segment {} failed: {}",
                        task.index(),
                        error
                    ));
                    failed_indices.push(task.index());
                }
            }
        }

        if result.manifest.is_empty() {
            return Err(PipelineError::job_failed(format!(
                "All {} rendered segment(s) failed to upload",
                succeeded.len()
            )));
        }

        failed_indices.sort_unstable();
        result.failed_indices = failed_indices;

        Ok(result)
    }

    async fn advance(&self, job_id: &JobId, state: JobState) {
        self.registry.update(job_id, |j| j.advance(state)).await;
    }

    async fn fail(&self, job_id: &JobId, logger: &JobLogger, diagnostic: String) {
        logger.log_error(&diagnostic);
        self.registry.update(job_id, |j| j.fail(diagnostic)).await;
    }
}
