//! Segment extraction from a source video.

use std::path::Path;

use splitcast_models::SegmentWindow;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Extract a single window from the source video.
///
/// Streams are copied without re-encoding; the overlay pass does the real
/// encode later. `-avoid_negative_ts make_zero` keeps copied streams seekable
/// when the cut lands between keyframes.
pub async fn extract_window(
    source: impl AsRef<Path>,
    window: &SegmentWindow,
    output: impl AsRef<Path>,
    timeout_secs: u64,
) -> MediaResult<()> {
    let source = source.as_ref();
    let output = output.as_ref();

    if !source.exists() {
        return Err(MediaError::FileNotFound(source.to_path_buf()));
    }

    debug!(
        index = window.index,
        start = window.start,
        end = window.end,
        output = %output.display(),
        "Extracting segment"
    );

    let cmd = FfmpegCommand::new(source, output)
        .seek(window.start)
        .duration(window.duration())
        .codec_copy()
        .output_args(["-avoid_negative_ts", "make_zero"]);

    FfmpegRunner::new().with_timeout(timeout_secs).run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_source_rejected() {
        let window = SegmentWindow::new(0, 0.0, 30.0);
        let result =
            extract_window("/nonexistent/source.mp4", &window, "/tmp/out.mp4", 60).await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }

    #[test]
    fn test_extract_args() {
        let window = SegmentWindow::new(2, 50.0, 80.0);
        let cmd = FfmpegCommand::new("src.mp4", "out.mp4")
            .seek(window.start)
            .duration(window.duration())
            .codec_copy()
            .output_args(["-avoid_negative_ts", "make_zero"]);

        let args = cmd.build_args();
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "50.000");
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "30.000");
        assert!(args.contains(&"make_zero".to_string()));
    }
}
