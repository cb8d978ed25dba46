//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure storage client: {0}")]
    ConfigError(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    /// Whether retrying the operation could plausibly succeed.
    ///
    /// Upload and SDK failures are usually network weather. Missing objects
    /// and bad configuration stay broken no matter how often we retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::UploadFailed(_) | Self::AwsSdk(_) | Self::Io(_) => true,
            Self::ConfigError(_) | Self::NotFound(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StorageError::upload_failed("connection reset").is_transient());
        assert!(StorageError::AwsSdk("dispatch failure".into()).is_transient());
        assert!(!StorageError::config_error("missing bucket").is_transient());
        assert!(!StorageError::not_found("videos/a.mp4").is_transient());
    }
}
