//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Source unreachable: {0}")]
    Unreachable(String),

    #[error("Source is not video content: {0}")]
    InvalidContent(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Create an unreachable-source error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable(message.into())
    }

    /// Create a non-video-content error.
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent(message.into())
    }

    /// Whether a retry can plausibly succeed.
    ///
    /// Timeouts, I/O errors, and network-level download failures are
    /// transient. An FFmpeg process with no exit code was killed by a signal
    /// (resource exhaustion); one that exited non-zero rejected its input and
    /// will do so again.
    pub fn is_transient(&self) -> bool {
        match self {
            MediaError::Timeout(_) | MediaError::Io(_) | MediaError::DownloadFailed { .. } => true,
            MediaError::FfmpegFailed { exit_code, .. } => exit_code.is_none(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(MediaError::Timeout(30).is_transient());
        assert!(MediaError::download_failed("connection reset").is_transient());
        assert!(MediaError::ffmpeg_failed("killed", None, None).is_transient());

        assert!(!MediaError::ffmpeg_failed("bad input", None, Some(1)).is_transient());
        assert!(!MediaError::unreachable("HTTP 404").is_transient());
        assert!(!MediaError::invalid_content("text/html").is_transient());
        assert!(!MediaError::InvalidVideo("no video stream".into()).is_transient());
        assert!(!MediaError::UnsupportedFormat("no duration".into()).is_transient());
        assert!(!MediaError::FfmpegNotFound.is_transient());
    }
}
