//! Capability traits the orchestrator works against.
//!
//! The pipeline only ever talks to media processing and artifact storage
//! through these traits, so tests can substitute controllable fakes and the
//! production wiring stays in one place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use splitcast_media::{
    apply_overlay, download_to_file, extract_window, probe_duration, MediaError, OverlayConfig,
};
use splitcast_models::{EncodingConfig, SegmentWindow};
use splitcast_storage::{S3Client, StorageError};

use crate::config::PipelineConfig;

/// A downloaded source video, probed and ready for planning.
#[derive(Debug, Clone)]
pub struct DownloadedSource {
    /// Local path of the downloaded file
    pub path: PathBuf,
    /// Probed duration in seconds
    pub duration_secs: f64,
}

/// Media operations the pipeline needs.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Fetch the source video to `dest` and probe its duration.
    async fn download(&self, url: &str, dest: &Path) -> Result<DownloadedSource, MediaError>;

    /// Extract one window from the source into `output`.
    async fn extract(
        &self,
        source: &Path,
        window: &SegmentWindow,
        output: &Path,
    ) -> Result<(), MediaError>;

    /// Render the overlay composition for an extracted segment.
    async fn overlay(
        &self,
        input: &Path,
        config: &OverlayConfig,
        output: &Path,
    ) -> Result<(), MediaError>;
}

/// Artifact publishing operations the pipeline needs.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload a rendered segment and return its public URL.
    async fn put(&self, path: &Path, key: &str, content_type: &str)
        -> Result<String, StorageError>;

    /// Probe the backing store for readiness checks.
    async fn check_connectivity(&self) -> Result<(), StorageError>;
}

/// Production media engine backed by FFmpeg and an HTTP client.
pub struct FfmpegEngine {
    http: reqwest::Client,
    encoding: EncodingConfig,
    download_timeout_secs: u64,
    ffmpeg_timeout_secs: u64,
}

impl FfmpegEngine {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            encoding: EncodingConfig::default(),
            download_timeout_secs: config.download_timeout_secs,
            ffmpeg_timeout_secs: config.ffmpeg_timeout_secs,
        }
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn download(&self, url: &str, dest: &Path) -> Result<DownloadedSource, MediaError> {
        download_to_file(&self.http, url, dest, self.download_timeout_secs).await?;
        let duration_secs = probe_duration(dest).await?;

        Ok(DownloadedSource {
            path: dest.to_path_buf(),
            duration_secs,
        })
    }

    async fn extract(
        &self,
        source: &Path,
        window: &SegmentWindow,
        output: &Path,
    ) -> Result<(), MediaError> {
        extract_window(source, window, output, self.ffmpeg_timeout_secs).await
    }

    async fn overlay(
        &self,
        input: &Path,
        config: &OverlayConfig,
        output: &Path,
    ) -> Result<(), MediaError> {
        apply_overlay(input, config, &self.encoding, output, self.ffmpeg_timeout_secs).await
    }
}

#[async_trait]
impl ArtifactStore for S3Client {
    async fn put(
        &self,
        path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.upload_file(path, key, content_type).await
    }

    async fn check_connectivity(&self) -> Result<(), StorageError> {
        S3Client::check_connectivity(self).await
    }
}
