//! Job lifecycle model: identifier, state machine states, terminal result.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::JobConfig;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a job in the pipeline.
///
/// `Completed` and `Failed` are terminal; every other state advances toward
/// one of them. A `Failed` job never carries a partial manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Accepted, waiting for a worker slot
    #[default]
    Queued,
    /// Fetching the source video
    Downloading,
    /// Computing segment windows
    Planning,
    /// Segment tasks running
    Processing,
    /// Publishing artifacts in index order
    Uploading,
    /// Terminal: at least one artifact published
    Completed,
    /// Terminal: nothing usable was produced
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Downloading => "downloading",
            JobState::Planning => "planning",
            JobState::Processing => "processing",
            JobState::Uploading => "uploading",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal result of a completed job.
///
/// `manifest` maps segment index to published URL; `failed_indices` lists the
/// indices that never produced a usable artifact (processing and upload
/// failures merged). Together they partition the planned index set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// Segment index -> public URL, ordered by index.
    pub manifest: BTreeMap<usize, String>,

    /// Indices with no published artifact, sorted ascending.
    pub failed_indices: Vec<usize>,
}

impl JobResult {
    /// Total number of planned segments this result accounts for.
    pub fn segment_count(&self) -> usize {
        self.manifest.len() + self.failed_indices.len()
    }

    /// True when every planned segment published successfully.
    pub fn is_full_success(&self) -> bool {
        self.failed_indices.is_empty()
    }
}

/// A segmentation-and-composition job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Remote source video URL
    pub source_url: String,

    /// Display title, rendered into the overlay and artifact names
    pub title: String,

    /// Configuration snapshot, fixed at creation
    pub config: JobConfig,

    /// Current state
    #[serde(default)]
    pub state: JobState,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Terminal manifest (set only on Completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,

    /// Diagnostic (set only on Failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Create a new queued job.
    pub fn new(source_url: impl Into<String>, title: impl Into<String>, config: JobConfig) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            source_url: source_url.into(),
            title: title.into(),
            config,
            state: JobState::Queued,
            created_at: now,
            updated_at: now,
            result: None,
            error: None,
        }
    }

    /// Advance to a non-terminal state.
    pub fn advance(&mut self, state: JobState) {
        self.state = state;
        self.updated_at = Utc::now();
    }

    /// Mark completed with its manifest.
    pub fn complete(&mut self, result: JobResult) {
        self.state = JobState::Completed;
        self.result = Some(result);
        self.updated_at = Utc::now();
    }

    /// Mark failed with a diagnostic. Never carries a manifest.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.state = JobState::Failed;
        self.error = Some(error.into());
        self.result = None;
        self.updated_at = Utc::now();
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_creation() {
        let job = Job::new("https://example.com/video.mp4", "My Movie", JobConfig::default());

        assert_eq!(job.state, JobState::Queued);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
        assert!(!job.is_terminal());
    }

    #[test]
    fn test_job_state_transitions() {
        let mut job = Job::new("https://example.com/v.mp4", "t", JobConfig::default());

        job.advance(JobState::Downloading);
        assert_eq!(job.state, JobState::Downloading);

        job.advance(JobState::Processing);
        let mut result = JobResult::default();
        result.manifest.insert(0, "https://cdn.example.com/p1.mp4".to_string());
        job.complete(result);

        assert!(job.is_terminal());
        assert_eq!(job.result.as_ref().unwrap().segment_count(), 1);
    }

    #[test]
    fn test_failed_job_has_no_manifest() {
        let mut job = Job::new("https://example.com/v.mp4", "t", JobConfig::default());
        let mut result = JobResult::default();
        result.manifest.insert(0, "url".to_string());
        job.complete(result);

        job.fail("late fault");
        assert_eq!(job.state, JobState::Failed);
        assert!(job.result.is_none());
        assert!(job.error.is_some());
    }

    #[test]
    fn test_state_serde_names() {
        assert_eq!(serde_json::to_string(&JobState::Queued).unwrap(), "\"queued\"");
        assert_eq!(serde_json::to_string(&JobState::Uploading).unwrap(), "\"uploading\"");
        let s: JobState = serde_json::from_str("\"planning\"").unwrap();
        assert_eq!(s, JobState::Planning);
    }

    #[test]
    fn test_result_partition_helpers() {
        let mut result = JobResult::default();
        result.manifest.insert(0, "a".into());
        result.manifest.insert(2, "b".into());
        result.failed_indices = vec![1];

        assert_eq!(result.segment_count(), 3);
        assert!(!result.is_full_success());
    }
}
