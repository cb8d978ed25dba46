//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use splitcast_models::JobConfig;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory for per-job scratch space
    pub work_dir: PathBuf,
    /// Maximum jobs processed concurrently
    pub max_concurrent_jobs: usize,
    /// Timeout for the source download
    pub download_timeout_secs: u64,
    /// Timeout for a single FFmpeg invocation
    pub ffmpeg_timeout_secs: u64,
    /// Timeout for a single artifact upload
    pub upload_timeout_secs: u64,
    /// First backoff delay after a transient failure
    pub retry_base_delay: Duration,
    /// Ceiling for backoff delays
    pub retry_max_delay: Duration,
    /// How long terminal jobs stay queryable
    pub job_retention: Duration,
    /// How often the retention sweeper runs
    pub retention_sweep_interval: Duration,
    /// Per-job defaults applied when a submission omits a field
    pub job_defaults: JobConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/splitcast"),
            max_concurrent_jobs: 2,
            download_timeout_secs: 300,
            ffmpeg_timeout_secs: 600,
            upload_timeout_secs: 300,
            retry_base_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(30),
            job_retention: Duration::from_secs(3600),
            retention_sweep_interval: Duration::from_secs(60),
            job_defaults: JobConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut job_defaults = JobConfig::default();

        if let Some(v) = std::env::var("SEGMENT_DURATION_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            job_defaults.segment_duration_secs = v;
        }
        if let Some(v) = std::env::var("SEGMENT_OVERLAP_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            job_defaults.overlap_secs = v;
        }
        if let Some(v) = std::env::var("MAX_RETRY_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            job_defaults.max_retry_attempts = v;
        }
        if let Some(v) = std::env::var("MAX_PARALLEL_WORKERS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            job_defaults.max_parallel_workers = v;
        }
        if let Ok(v) = std::env::var("OVERLAY_IMAGE") {
            job_defaults.overlay.banner_image = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("END_CREDIT_IMAGE") {
            job_defaults.overlay.end_credit_image = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("FONT_FILE") {
            job_defaults.overlay.font_file = PathBuf::from(v);
        }
        if let Some(v) = std::env::var("END_CREDIT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            job_defaults.overlay.end_credit_secs = v;
        }

        Self {
            work_dir: std::env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/splitcast")),
            max_concurrent_jobs: std::env::var("MAX_CONCURRENT_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            download_timeout_secs: std::env::var("DOWNLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            ffmpeg_timeout_secs: std::env::var("FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(600),
            upload_timeout_secs: std::env::var("UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            retry_base_delay: Duration::from_millis(
                std::env::var("RETRY_BASE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
            retry_max_delay: Duration::from_secs(
                std::env::var("RETRY_MAX_DELAY_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            job_retention: Duration::from_secs(
                std::env::var("JOB_RETENTION_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            retention_sweep_interval: Duration::from_secs(
                std::env::var("RETENTION_SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            job_defaults,
        }
    }
}
