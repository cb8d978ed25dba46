//! S3-compatible client implementation.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Configuration for the storage client.
///
/// Works against any S3-compatible endpoint (AWS, R2, MinIO).
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("auto" for R2-style endpoints)
    pub region: String,
    /// Base URL for public object links; defaults to `{endpoint}/{bucket}`
    pub public_base_url: Option<String>,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("S3_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("S3_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("S3_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("S3_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("S3_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("S3_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("S3_BUCKET_NAME not set"))?,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_base_url: std::env::var("S3_PUBLIC_BASE_URL").ok(),
        })
    }
}

/// Join a public base URL with an object key.
fn join_object_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

/// Object storage client for published segments.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
    public_base: String,
}

impl S3Client {
    /// Create a new client from configuration.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "splitcast",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(sdk_config);

        let public_base = config.public_base_url.unwrap_or_else(|| {
            join_object_url(&config.endpoint_url, &config.bucket_name)
        });

        Ok(Self {
            client,
            bucket: config.bucket_name,
            public_base,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }

    /// Bucket this client publishes into.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL for an object key.
    pub fn object_url(&self, key: &str) -> String {
        join_object_url(&self.public_base, key)
    }

    /// Upload a local file and return its public URL.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(StorageError::not_found(path.display().to_string()));
        }

        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to {}", path.display(), key);

        Ok(self.object_url(key))
    }

    /// Check connectivity by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("Storage connectivity check failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_object_url() {
        assert_eq!(
            join_object_url("https://cdn.example.com", "videos/a/p_001.mp4"),
            "https://cdn.example.com/videos/a/p_001.mp4"
        );
        assert_eq!(
            join_object_url("https://cdn.example.com/", "/videos/a.mp4"),
            "https://cdn.example.com/videos/a.mp4"
        );
    }
}
