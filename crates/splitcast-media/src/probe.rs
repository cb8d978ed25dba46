//! Media probing via ffprobe.

use std::path::Path;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// ffprobe JSON output.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
}

/// Probe a media file and return its duration in seconds.
///
/// Fails with `InvalidVideo` when the file has no video stream, and
/// `UnsupportedFormat` when the container reports no parseable duration.
pub async fn probe_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(MediaError::FfprobeFailed {
            message: format!("ffprobe failed for {}", path.display()),
            stderr: Some(stderr),
        });
    }

    let parsed: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let has_video = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("video"));
    if !has_video {
        return Err(MediaError::InvalidVideo(format!(
            "No video stream found in {}",
            path.display()
        )));
    }

    let duration = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| {
            MediaError::UnsupportedFormat(format!("No duration reported for {}", path.display()))
        })?;

    debug!(path = %path.display(), duration, "Probed media duration");

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ffprobe_output() {
        let json = r#"{
            "streams": [
                {"codec_type": "video"},
                {"codec_type": "audio"}
            ],
            "format": {"duration": "125.4"}
        }"#;

        let parsed: FfprobeOutput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.streams.len(), 2);
        assert_eq!(
            parsed.format.unwrap().duration.unwrap().parse::<f64>().unwrap(),
            125.4
        );
    }

    #[test]
    fn test_parse_output_without_streams() {
        let json = r#"{"format": {"duration": "10.0"}}"#;
        let parsed: FfprobeOutput = serde_json::from_str(json).unwrap();
        assert!(parsed.streams.is_empty());
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let result = probe_duration("/nonexistent/video.mp4").await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
