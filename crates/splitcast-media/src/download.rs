//! Source video download over HTTP.
//!
//! Streams the response body to disk chunk by chunk so large sources never
//! have to fit in memory.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::error::{MediaError, MediaResult};

/// Content types that indicate an error page rather than a video payload.
const REJECTED_CONTENT_TYPES: [&str; 3] = ["text/", "html", "application/json"];

/// Check whether a content type looks like a servable video payload.
///
/// Servers frequently answer dead links with an HTML error page and a 200
/// status, so the type header is checked before any bytes hit disk.
fn is_rejected_content_type(content_type: &str) -> bool {
    let lowered = content_type.to_ascii_lowercase();
    REJECTED_CONTENT_TYPES
        .iter()
        .any(|rejected| lowered.contains(rejected))
}

/// Download a remote video to a local file.
///
/// The entire operation is bounded by `timeout_secs`. Returns the number of
/// bytes written.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: impl AsRef<Path>,
    timeout_secs: u64,
) -> MediaResult<u64> {
    let dest = dest.as_ref();

    match tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        fetch_to_file(client, url, dest),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(MediaError::Timeout(timeout_secs)),
    }
}

async fn fetch_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> MediaResult<u64> {
    let parsed = Url::parse(url)
        .map_err(|e| MediaError::unreachable(format!("Invalid URL {}: {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(MediaError::unreachable(format!(
            "Unsupported URL scheme: {}",
            parsed.scheme()
        )));
    }

    debug!(url, dest = %dest.display(), "Starting download");

    let response = client.get(parsed).send().await.map_err(|e| {
        if e.is_connect() {
            MediaError::unreachable(format!("Failed to connect to {}: {}", url, e))
        } else {
            MediaError::download_failed(format!("Request to {} failed: {}", url, e))
        }
    })?;

    let status = response.status();
    if status.is_client_error() {
        return Err(MediaError::unreachable(format!(
            "Source returned {} for {}",
            status, url
        )));
    }
    if !status.is_success() {
        return Err(MediaError::download_failed(format!(
            "Source returned {} for {}",
            status, url
        )));
    }

    if let Some(content_type) = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        if is_rejected_content_type(content_type) {
            return Err(MediaError::invalid_content(format!(
                "Source returned non-video content type: {}",
                content_type
            )));
        }
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut total: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| MediaError::download_failed(format!("Stream interrupted: {}", e)))?;
        file.write_all(&chunk).await?;
        total += chunk.len() as u64;
    }

    file.flush().await?;

    if total == 0 {
        return Err(MediaError::invalid_content(format!(
            "Downloaded file from {} is empty",
            url
        )));
    }

    info!(url, bytes = total, "Download complete");

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_content_type_rejection() {
        assert!(is_rejected_content_type("text/html"));
        assert!(is_rejected_content_type("TEXT/HTML; charset=utf-8"));
        assert!(is_rejected_content_type("application/json"));
        assert!(!is_rejected_content_type("video/mp4"));
        assert!(!is_rejected_content_type("application/octet-stream"));
    }

    #[tokio::test]
    async fn test_download_writes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clip.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .set_body_bytes(b"fake video bytes".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("source.mp4");
        let client = reqwest::Client::new();

        let bytes = download_to_file(&client, &format!("{}/clip.mp4", server.uri()), &dest, 30)
            .await
            .unwrap();

        assert_eq!(bytes, 16);
        assert_eq!(std::fs::read(&dest).unwrap(), b"fake video bytes");
    }

    #[tokio::test]
    async fn test_html_response_is_invalid_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clip.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html>not found</html>"),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();

        let result = download_to_file(
            &client,
            &format!("{}/clip.mp4", server.uri()),
            dir.path().join("source.mp4"),
            30,
        )
        .await;

        assert!(matches!(result, Err(MediaError::InvalidContent(_))));
    }

    #[tokio::test]
    async fn test_not_found_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clip.mp4"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();

        let result = download_to_file(
            &client,
            &format!("{}/clip.mp4", server.uri()),
            dir.path().join("source.mp4"),
            30,
        )
        .await;

        match result {
            Err(e @ MediaError::Unreachable(_)) => assert!(!e.is_transient()),
            other => panic!("expected Unreachable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clip.mp4"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();

        let result = download_to_file(
            &client,
            &format!("{}/clip.mp4", server.uri()),
            dir.path().join("source.mp4"),
            30,
        )
        .await;

        match result {
            Err(e @ MediaError::DownloadFailed { .. }) => assert!(e.is_transient()),
            other => panic!("expected DownloadFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_body_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clip.mp4"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("content-type", "video/mp4"),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();

        let result = download_to_file(
            &client,
            &format!("{}/clip.mp4", server.uri()),
            dir.path().join("source.mp4"),
            30,
        )
        .await;

        assert!(matches!(result, Err(MediaError::InvalidContent(_))));
    }

    #[tokio::test]
    async fn test_malformed_url() {
        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();

        let result =
            download_to_file(&client, "not a url", dir.path().join("source.mp4"), 30).await;

        assert!(matches!(result, Err(MediaError::Unreachable(_))));
    }
}
