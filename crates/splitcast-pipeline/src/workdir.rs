//! Per-job scratch space management.
//!
//! Every job gets its own directory under the configured work root: the
//! downloaded source at the top, and one subdirectory per segment task for
//! that task's working files. Teardown is a single recursive remove that is
//! safe to call on every exit path.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use splitcast_models::JobId;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::PipelineResult;

/// Scratch directory for a single job.
#[derive(Debug)]
pub struct JobWorkspace {
    root: PathBuf,
    cleaned: AtomicBool,
}

impl JobWorkspace {
    /// Create the workspace root for a job.
    pub async fn create(base: impl AsRef<Path>, job_id: &JobId) -> PipelineResult<Self> {
        let root = base.as_ref().join(job_id.as_str());

        fs::create_dir_all(&root).await?;

        debug!(job_id = %job_id, root = %root.display(), "Created job workspace");

        Ok(Self {
            root,
            cleaned: AtomicBool::new(false),
        })
    }

    /// Workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the downloaded source video lands.
    pub fn source_path(&self) -> PathBuf {
        self.root.join("source.mp4")
    }

    /// Parent directory of all per-task subdirectories.
    pub fn tasks_dir(&self) -> PathBuf {
        self.root.join("tasks")
    }

    /// Working directory for one segment task.
    ///
    /// The worker creates it at dispatch; nothing outside that task writes
    /// under it.
    pub fn task_dir(&self, index: usize) -> PathBuf {
        self.tasks_dir().join(format!("{:03}", index))
    }

    /// Remove the workspace and everything in it.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub async fn cleanup(&self) -> PipelineResult<()> {
        if self.cleaned.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if self.root.exists() {
            info!(root = %self.root.display(), "Cleaning up job workspace");
            fs::remove_dir_all(&self.root).await?;
        }

        Ok(())
    }

    /// Remove every leftover entry under the work root.
    ///
    /// Run at startup so workspaces orphaned by a crash don't accumulate.
    /// Returns the number of entries removed.
    pub async fn sweep_base(base: impl AsRef<Path>) -> PipelineResult<usize> {
        let base = base.as_ref();

        if !base.exists() {
            fs::create_dir_all(base).await?;
            return Ok(0);
        }

        let mut removed = 0usize;
        let mut entries = fs::read_dir(base).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let result = if entry.file_type().await?.is_dir() {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };

            match result {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(path = %path.display(), "Failed to sweep leftover entry: {}", e);
                }
            }
        }

        if removed > 0 {
            info!(base = %base.display(), removed, "Swept leftover workspaces");
        }

        Ok(removed)
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if !self.cleaned.load(Ordering::SeqCst) && self.root.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.root) {
                warn!(root = %self.root.display(), "Workspace cleanup on drop failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_and_cleanup() {
        let base = TempDir::new().unwrap();
        let job_id = JobId::new();

        let ws = JobWorkspace::create(base.path(), &job_id).await.unwrap();
        assert!(ws.root().exists());
        assert!(ws.root().starts_with(base.path()));

        tokio::fs::write(ws.source_path(), b"x").await.unwrap();
        tokio::fs::create_dir_all(ws.task_dir(0)).await.unwrap();
        tokio::fs::write(ws.task_dir(0).join("segment.mp4"), b"x")
            .await
            .unwrap();

        ws.cleanup().await.unwrap();
        assert!(!ws.root().exists());

        // Idempotent
        ws.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_task_paths() {
        let base = TempDir::new().unwrap();
        let ws = JobWorkspace::create(base.path(), &JobId::new()).await.unwrap();

        assert!(ws.task_dir(4).ends_with("tasks/004"));
        assert!(ws.task_dir(4).starts_with(ws.root()));
        assert_ne!(ws.task_dir(1), ws.task_dir(2));

        ws.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_drop_removes_workspace() {
        let base = TempDir::new().unwrap();
        let root = {
            let ws = JobWorkspace::create(base.path(), &JobId::new()).await.unwrap();
            ws.root().to_path_buf()
        };

        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_sweep_base() {
        let base = TempDir::new().unwrap();

        tokio::fs::create_dir_all(base.path().join("old-job/segments"))
            .await
            .unwrap();
        tokio::fs::write(base.path().join("stray.mp4"), b"x")
            .await
            .unwrap();

        let removed = JobWorkspace::sweep_base(base.path()).await.unwrap();
        assert_eq!(removed, 2);
        assert!(base.path().exists());
        assert!(!base.path().join("old-job").exists());
    }

    #[tokio::test]
    async fn test_sweep_creates_missing_base() {
        let base = TempDir::new().unwrap();
        let nested = base.path().join("work");

        let removed = JobWorkspace::sweep_base(&nested).await.unwrap();
        assert_eq!(removed, 0);
        assert!(nested.exists());
    }
}
