//! In-memory job registry and retention sweeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use splitcast_models::{Job, JobId};
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Shared registry of every job the service knows about.
///
/// Reads hand out snapshots; writes go through [`JobRegistry::update`], which
/// refuses to touch a job that already reached a terminal state.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly accepted job.
    pub async fn insert(&self, job: Job) {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id.clone(), job);
    }

    /// Snapshot of a job by ID.
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        let jobs = self.jobs.read().await;
        jobs.get(id).cloned()
    }

    /// Number of registered jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Apply a mutation to a live job.
    ///
    /// Returns false (and leaves the job untouched) when the job is unknown
    /// or already terminal.
    pub async fn update<F>(&self, id: &JobId, mutate: F) -> bool
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;

        match jobs.get_mut(id) {
            Some(job) if job.is_terminal() => {
                warn!(job_id = %id, state = %job.state, "Ignoring update to terminal job");
                false
            }
            Some(job) => {
                mutate(job);
                true
            }
            None => {
                warn!(job_id = %id, "Ignoring update to unknown job");
                false
            }
        }
    }

    /// Evict terminal jobs whose last update is older than `retention`.
    ///
    /// Returns the number of jobs evicted. Live jobs are never touched.
    pub async fn evict_terminal_older_than(&self, retention: Duration) -> usize {
        let now = Utc::now();
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();

        jobs.retain(|_, job| {
            if !job.is_terminal() {
                return true;
            }
            let age = now
                .signed_duration_since(job.updated_at)
                .to_std()
                .unwrap_or_default();
            age < retention
        });

        before - jobs.len()
    }
}

/// Background task that evicts expired terminal jobs.
pub struct RetentionSweeper {
    registry: JobRegistry,
    retention: Duration,
    sweep_interval: Duration,
}

impl RetentionSweeper {
    pub fn new(registry: JobRegistry, retention: Duration, sweep_interval: Duration) -> Self {
        Self {
            registry,
            retention,
            sweep_interval,
        }
    }

    /// Run the sweep loop forever. Spawn this as a background task.
    pub async fn run(&self) {
        info!(
            retention_secs = self.retention.as_secs(),
            interval_secs = self.sweep_interval.as_secs(),
            "Starting job retention sweeper"
        );

        let mut ticker = interval(self.sweep_interval);

        loop {
            ticker.tick().await;

            let evicted = self.sweep_once().await;
            if evicted > 0 {
                info!(evicted, "Evicted expired terminal jobs");
            }
        }
    }

    /// Run a single sweep cycle.
    pub async fn sweep_once(&self) -> usize {
        let evicted = self.registry.evict_terminal_older_than(self.retention).await;
        debug!(evicted, "Retention sweep complete");
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitcast_models::{JobConfig, JobResult, JobState};

    fn job() -> Job {
        Job::new("https://example.com/v.mp4", "title", JobConfig::default())
    }

    #[tokio::test]
    async fn test_insert_and_snapshot() {
        let registry = JobRegistry::new();
        let job = job();
        let id = job.id.clone();

        registry.insert(job).await;

        let snapshot = registry.get(&id).await.unwrap();
        assert_eq!(snapshot.state, JobState::Queued);
        assert!(registry.get(&JobId::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_update_advances_live_job() {
        let registry = JobRegistry::new();
        let job = job();
        let id = job.id.clone();
        registry.insert(job).await;

        let applied = registry
            .update(&id, |j| j.advance(JobState::Downloading))
            .await;

        assert!(applied);
        assert_eq!(registry.get(&id).await.unwrap().state, JobState::Downloading);
    }

    #[tokio::test]
    async fn test_terminal_jobs_are_immutable() {
        let registry = JobRegistry::new();
        let job = job();
        let id = job.id.clone();
        registry.insert(job).await;

        registry.update(&id, |j| j.complete(JobResult::default())).await;

        let applied = registry.update(&id, |j| j.fail("too late")).await;
        assert!(!applied);

        let snapshot = registry.get(&id).await.unwrap();
        assert_eq!(snapshot.state, JobState::Completed);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_eviction_only_touches_expired_terminal_jobs() {
        let registry = JobRegistry::new();

        let live = job();
        let live_id = live.id.clone();
        registry.insert(live).await;

        let mut done = job();
        done.complete(JobResult::default());
        done.updated_at = Utc::now() - chrono::Duration::seconds(120);
        let done_id = done.id.clone();
        registry.insert(done).await;

        let mut fresh_done = job();
        fresh_done.complete(JobResult::default());
        let fresh_id = fresh_done.id.clone();
        registry.insert(fresh_done).await;

        let evicted = registry
            .evict_terminal_older_than(Duration::from_secs(60))
            .await;

        assert_eq!(evicted, 1);
        assert!(registry.get(&live_id).await.is_some());
        assert!(registry.get(&done_id).await.is_none());
        assert!(registry.get(&fresh_id).await.is_some());
    }

    #[tokio::test]
    async fn test_sweeper_single_cycle() {
        let registry = JobRegistry::new();

        let mut done = job();
        done.complete(JobResult::default());
        done.updated_at = Utc::now() - chrono::Duration::seconds(10);
        registry.insert(done).await;

        let sweeper = RetentionSweeper::new(
            registry.clone(),
            Duration::from_secs(1),
            Duration::from_secs(60),
        );

        assert_eq!(sweeper.sweep_once().await, 1);
        assert!(registry.is_empty().await);
    }
}
