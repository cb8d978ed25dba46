//! Segment windows and per-segment task bookkeeping.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A half-open time window `[start, end)` of the source video, in seconds.
///
/// `index` is 0-based and defines the final artifact ordering; display
/// numbering (overlay text, file names) is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentWindow {
    /// 0-based segment index
    pub index: usize,

    /// Window start, seconds from source start
    pub start: f64,

    /// Window end (exclusive), seconds from source start
    pub end: f64,
}

impl SegmentWindow {
    pub fn new(index: usize, start: f64, end: f64) -> Self {
        Self { index, start, end }
    }

    /// Window length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// 1-based number shown to viewers ("Part No - 1" is index 0).
    pub fn display_number(&self) -> usize {
        self.index + 1
    }
}

/// Status of a segment task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Planned, not yet dispatched
    #[default]
    Pending,
    /// Dispatched to a worker
    Running,
    /// Artifact produced
    Succeeded,
    /// No artifact; failure reason recorded
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

/// One unit of per-segment work: extract the window, composite the overlay.
///
/// The downloaded source is shared read-only across all tasks of a job; the
/// working files referenced here are owned exclusively by this task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentTask {
    /// The window this task renders
    pub window: SegmentWindow,

    /// Attempts consumed so far (total, not retries)
    #[serde(default)]
    pub attempts: u32,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Finished artifact path (present iff status is Succeeded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Failure reason (present iff status is Failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl SegmentTask {
    /// Create a pending task for a planned window.
    pub fn new(window: SegmentWindow) -> Self {
        Self {
            window,
            attempts: 0,
            status: TaskStatus::Pending,
            output: None,
            failure: None,
        }
    }

    /// 0-based segment index.
    pub fn index(&self) -> usize {
        self.window.index
    }

    /// Mark dispatched.
    pub fn running(mut self) -> Self {
        self.status = TaskStatus::Running;
        self
    }

    /// Mark succeeded with the artifact path and the attempts consumed.
    pub fn succeeded(mut self, output: PathBuf, attempts: u32) -> Self {
        self.status = TaskStatus::Succeeded;
        self.output = Some(output);
        self.failure = None;
        self.attempts = attempts;
        self
    }

    /// Mark failed with a diagnostic and the attempts consumed.
    pub fn failed(mut self, reason: impl Into<String>, attempts: u32) -> Self {
        self.status = TaskStatus::Failed;
        self.output = None;
        self.failure = Some(reason.into());
        self.attempts = attempts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_duration_and_display_number() {
        let w = SegmentWindow::new(4, 100.0, 125.0);
        assert_eq!(w.duration(), 25.0);
        assert_eq!(w.display_number(), 5);
    }

    #[test]
    fn test_artifact_presence_tracks_status() {
        let task = SegmentTask::new(SegmentWindow::new(0, 0.0, 30.0));
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.output.is_none());

        let ok = task.clone().running().succeeded(PathBuf::from("/tmp/a.mp4"), 1);
        assert_eq!(ok.status, TaskStatus::Succeeded);
        assert!(ok.output.is_some());
        assert!(ok.failure.is_none());

        let bad = task.running().failed("ffmpeg exited 1", 3);
        assert_eq!(bad.status, TaskStatus::Failed);
        assert!(bad.output.is_none());
        assert_eq!(bad.attempts, 3);
    }

    #[test]
    fn test_status_terminality() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }
}
