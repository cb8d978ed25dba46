//! Branded overlay rendering for vertical video segments.
//!
//! Every segment is composed onto a 1080x1920 canvas: the banner image on
//! top, the segment video letterboxed below it, and two caption lines in the
//! gap between them. The final segment additionally gets an end credit card
//! appended from a looped still image.

use std::path::{Path, PathBuf};

use splitcast_models::EncodingConfig;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils;

/// Output canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 1080;

/// Output canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 1920;

/// Height of the letterboxed segment video region.
pub const MAIN_VIDEO_HEIGHT: u32 = 1312;

/// Vertical offset where the segment video region starts.
pub const MAIN_VIDEO_Y: u32 = 608;

/// Font size for both caption lines.
pub const CAPTION_FONT_SIZE: u32 = 48;

/// Vertical position of the part-number caption.
pub const PART_LINE_Y: u32 = 1220;

/// Vertical position of the title caption.
pub const TITLE_LINE_Y: u32 = 1266;

/// End credit card appended after the segment video.
#[derive(Debug, Clone)]
pub struct EndCredit {
    /// Still image shown as the credit card
    pub image: PathBuf,
    /// How long the card stays on screen
    pub duration_secs: f64,
}

/// Everything needed to render the overlay for one segment.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Banner image composited at the top of the canvas
    pub banner_image: PathBuf,
    /// Font used for both caption lines
    pub font_file: PathBuf,
    /// One-based part number shown in the caption
    pub part_number: usize,
    /// Display title shown in the caption
    pub title: String,
    /// End credit card, present only on the final segment
    pub end_credit: Option<EndCredit>,
}

impl OverlayConfig {
    pub fn new(
        banner_image: impl Into<PathBuf>,
        font_file: impl Into<PathBuf>,
        part_number: usize,
        title: impl Into<String>,
    ) -> Self {
        Self {
            banner_image: banner_image.into(),
            font_file: font_file.into(),
            part_number,
            title: title.into(),
            end_credit: None,
        }
    }

    /// Append an end credit card after the segment.
    pub fn with_end_credit(mut self, image: impl Into<PathBuf>, duration_secs: f64) -> Self {
        self.end_credit = Some(EndCredit {
            image: image.into(),
            duration_secs,
        });
        self
    }

    /// Check that every referenced asset exists on disk.
    fn validate(&self) -> MediaResult<()> {
        if !self.banner_image.exists() {
            return Err(MediaError::FileNotFound(self.banner_image.clone()));
        }
        if !self.font_file.exists() {
            return Err(MediaError::FileNotFound(self.font_file.clone()));
        }
        if let Some(credit) = &self.end_credit {
            if !credit.image.exists() {
                return Err(MediaError::FileNotFound(credit.image.clone()));
            }
        }
        Ok(())
    }
}

/// Escape a value for use inside a filter graph expression.
fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
}

/// Build the filter complex for one segment.
///
/// Input 0 is the segment video, input 1 the banner image, and input 2 the
/// looped end credit image when present.
fn build_overlay_filter(config: &OverlayConfig) -> String {
    let font = escape_filter_value(&config.font_file.to_string_lossy());
    let title = escape_filter_value(&config.title);

    let mut chains = vec![
        format!("[1:v]scale={CANVAS_WIDTH}:-1,setsar=1[top]"),
        format!(
            "[0:v]scale={CANVAS_WIDTH}:{MAIN_VIDEO_HEIGHT}:force_original_aspect_ratio=decrease,\
             pad={CANVAS_WIDTH}:{CANVAS_HEIGHT}:0:{MAIN_VIDEO_Y}:color=black,setsar=1[main]"
        ),
        "[main][top]overlay=0:0[over]".to_string(),
        format!(
            "[over]drawtext=text='Part No - {}':fontfile='{}':fontsize={}:fontcolor=white:\
             x=(w-tw)/2:y={}[txt1]",
            config.part_number, font, CAPTION_FONT_SIZE, PART_LINE_Y
        ),
    ];

    let title_out = if config.end_credit.is_some() {
        "txt2"
    } else {
        "outv"
    };
    chains.push(format!(
        "[txt1]drawtext=text='{}':fontfile='{}':fontsize={}:fontcolor=white:\
         x=(w-tw)/2:y={}[{}]",
        title, font, CAPTION_FONT_SIZE, TITLE_LINE_Y, title_out
    ));

    if config.end_credit.is_some() {
        chains.push(format!(
            "[2:v]scale={CANVAS_WIDTH}:{CANVAS_HEIGHT},setsar=1[end]"
        ));
        chains.push("[txt2][end]concat=n=2:v=1:a=0[outv]".to_string());
    }

    chains.push("[0:a]aresample=async=1[outa]".to_string());

    chains.join(";")
}

/// Assemble the full render command for one segment.
fn build_render_command(
    input: &Path,
    config: &OverlayConfig,
    encoding: &EncodingConfig,
    output: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(input, output).extra_input(&config.banner_image);

    if let Some(credit) = &config.end_credit {
        cmd = cmd.looped_image_input(&credit.image, credit.duration_secs);
    }

    cmd.filter_complex(build_overlay_filter(config))
        .map("[outv]")
        .map("[outa]")
        .output_args(encoding.to_ffmpeg_args())
}

/// Render the overlay composition for one extracted segment.
///
/// Renders to a sibling temp file and moves it into place only on success,
/// so `output` never holds a partial render.
pub async fn apply_overlay(
    input: impl AsRef<Path>,
    config: &OverlayConfig,
    encoding: &EncodingConfig,
    output: impl AsRef<Path>,
    timeout_secs: u64,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }
    config.validate()?;

    let temp_output = output.with_extension("render.mp4");

    debug!(
        input = %input.display(),
        part = config.part_number,
        end_credit = config.end_credit.is_some(),
        "Rendering segment overlay"
    );

    let cmd = build_render_command(input, config, encoding, &temp_output);
    let result = FfmpegRunner::new().with_timeout(timeout_secs).run(&cmd).await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&temp_output).await;
        return Err(e);
    }

    fs_utils::move_file(&temp_output, output).await?;

    info!(
        output = %output.display(),
        part = config.part_number,
        "Segment overlay rendered"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> OverlayConfig {
        OverlayConfig::new("banner.png", "/fonts/Bold.ttf", 3, "Night Train")
    }

    #[test]
    fn test_filter_without_end_credit() {
        let filter = build_overlay_filter(&config());

        assert!(filter.contains("Part No - 3"));
        assert!(filter.contains("Night Train"));
        assert!(filter.contains("pad=1080:1920:0:608"));
        assert!(filter.contains("[0:a]aresample=async=1[outa]"));
        assert!(!filter.contains("concat"));
        assert!(!filter.contains("[2:v]"));
        // Title line feeds the output directly
        assert!(filter.contains("y=1266[outv]"));
    }

    #[test]
    fn test_filter_with_end_credit() {
        let filter = build_overlay_filter(&config().with_end_credit("credit.png", 3.0));

        assert!(filter.contains("[2:v]scale=1080:1920,setsar=1[end]"));
        assert!(filter.contains("[txt2][end]concat=n=2:v=1:a=0[outv]"));
        assert!(filter.contains("y=1266[txt2]"));
    }

    #[test]
    fn test_title_escaping() {
        let config = OverlayConfig::new("b.png", "/f.ttf", 1, "Marvel's Heroes: Reborn");
        let filter = build_overlay_filter(&config);

        assert!(filter.contains("Marvel\\'s Heroes\\: Reborn"));
    }

    #[test]
    fn test_render_command_inputs() {
        let encoding = EncodingConfig::default();
        let config = config().with_end_credit("credit.png", 3.0);
        let cmd = build_render_command(
            Path::new("seg.mp4"),
            &config,
            &encoding,
            Path::new("out.mp4"),
        );

        let args = cmd.build_args();
        let inputs: Vec<&String> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-i")
            .map(|(i, _)| &args[i + 1])
            .collect();

        assert_eq!(inputs, ["seg.mp4", "banner.png", "credit.png"]);
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"[outv]".to_string()));
        assert!(args.contains(&"[outa]".to_string()));
    }

    #[tokio::test]
    async fn test_missing_banner_rejected() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("seg.mp4");
        std::fs::write(&input, b"x").unwrap();

        let config = OverlayConfig::new(dir.path().join("absent.png"), "/f.ttf", 1, "t");
        let result = apply_overlay(
            &input,
            &config,
            &EncodingConfig::default(),
            dir.path().join("out.mp4"),
            60,
        )
        .await;

        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
