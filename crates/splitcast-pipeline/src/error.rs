//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Job-fatal aggregate condition, carrying the diagnostic recorded on
    /// the job.
    #[error("{0}")]
    JobFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] splitcast_models::ConfigError),

    #[error("Media error: {0}")]
    Media(#[from] splitcast_media::MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] splitcast_storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    /// Check if retrying could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Media(e) => e.is_transient(),
            Self::Storage(e) => e.is_transient(),
            Self::Io(_) => true,
            Self::JobFailed(_) | Self::Configuration(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitcast_media::MediaError;

    #[test]
    fn test_transient_passthrough() {
        let timeout: PipelineError = MediaError::Timeout(30).into();
        assert!(timeout.is_transient());

        let invalid: PipelineError = MediaError::InvalidVideo("no stream".into()).into();
        assert!(!invalid.is_transient());

        let config: PipelineError =
            splitcast_models::ConfigError::NonPositiveDuration(0.0).into();
        assert!(!config.is_transient());
    }
}
