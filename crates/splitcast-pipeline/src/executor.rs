//! Bounded job execution.

use std::sync::Arc;

use splitcast_models::JobId;
use tokio::sync::Semaphore;
use tracing::info;

use crate::orchestrator::Orchestrator;

/// Runs jobs with a bound on how many execute at once.
///
/// Submission never blocks: a submitted job sits in `Queued` until a slot
/// frees, then runs to a terminal state.
pub struct JobExecutor {
    orchestrator: Arc<Orchestrator>,
    semaphore: Arc<Semaphore>,
    max_concurrent_jobs: usize,
}

impl JobExecutor {
    pub fn new(orchestrator: Arc<Orchestrator>, max_concurrent_jobs: usize) -> Self {
        let max_concurrent_jobs = max_concurrent_jobs.max(1);
        info!(max_concurrent_jobs, "Job executor ready");

        Self {
            orchestrator,
            semaphore: Arc::new(Semaphore::new(max_concurrent_jobs)),
            max_concurrent_jobs,
        }
    }

    /// Hand a registered job to the pool.
    pub fn submit(&self, job_id: JobId) {
        let orchestrator = self.orchestrator.clone();
        let semaphore = self.semaphore.clone();

        tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            orchestrator.run_job(&job_id).await;
        });
    }

    /// Slots currently free.
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Configured pool size.
    pub fn capacity(&self) -> usize {
        self.max_concurrent_jobs
    }
}
