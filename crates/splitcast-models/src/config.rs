//! Per-job configuration snapshot and its validation.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default segment duration in seconds
pub const DEFAULT_SEGMENT_DURATION_SECS: f64 = 60.0;
/// Default overlap between consecutive segments
pub const DEFAULT_OVERLAP_SECS: f64 = 0.0;
/// Default total attempt bound per retryable unit
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;
/// Default worker pool size per job
pub const DEFAULT_MAX_PARALLEL_WORKERS: usize = 4;
/// Default end-credit duration when rendered from a still image
pub const DEFAULT_END_CREDIT_SECS: f64 = 3.0;

/// Invalid planning inputs. Never retried; surfaces immediately.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Segment duration must be > 0
    NonPositiveDuration(f64),
    /// Overlap must be >= 0
    NegativeOverlap(f64),
    /// Overlap must be strictly below the segment duration
    OverlapNotBelowDuration { overlap: f64, duration: f64 },
    /// Source duration must be > 0 to plan anything
    NonPositiveSourceDuration(f64),
    /// Worker pool must hold at least one worker
    ZeroWorkers,
    /// Every task needs at least one attempt
    ZeroAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveDuration(d) => {
                write!(f, "segment duration must be positive, got {}", d)
            }
            ConfigError::NegativeOverlap(o) => {
                write!(f, "segment overlap must be non-negative, got {}", o)
            }
            ConfigError::OverlapNotBelowDuration { overlap, duration } => {
                write!(
                    f,
                    "segment overlap ({}) must be below segment duration ({})",
                    overlap, duration
                )
            }
            ConfigError::NonPositiveSourceDuration(d) => {
                write!(f, "source duration must be positive, got {}", d)
            }
            ConfigError::ZeroWorkers => write!(f, "max_parallel_workers must be at least 1"),
            ConfigError::ZeroAttempts => write!(f, "max_retry_attempts must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Fixed overlay inputs for a job: banner image, title font, end credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayAssets {
    /// Banner image composited at the top of every segment
    #[serde(default = "default_banner_image")]
    pub banner_image: PathBuf,

    /// Font used for the part number and title lines
    #[serde(default = "default_font_file")]
    pub font_file: PathBuf,

    /// End-credit still image, appended to the final segment only
    #[serde(default = "default_end_credit_image")]
    pub end_credit_image: PathBuf,

    /// Seconds the end-credit image is held on screen
    #[serde(default = "default_end_credit_secs")]
    pub end_credit_secs: f64,
}

fn default_banner_image() -> PathBuf {
    PathBuf::from("image.png")
}
fn default_font_file() -> PathBuf {
    PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf")
}
fn default_end_credit_image() -> PathBuf {
    PathBuf::from("end_credit.png")
}
fn default_end_credit_secs() -> f64 {
    DEFAULT_END_CREDIT_SECS
}

impl Default for OverlayAssets {
    fn default() -> Self {
        Self {
            banner_image: default_banner_image(),
            font_file: default_font_file(),
            end_credit_image: default_end_credit_image(),
            end_credit_secs: DEFAULT_END_CREDIT_SECS,
        }
    }
}

/// Configuration snapshot for one job. Fixed at creation, never mutated
/// mid-job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Target length of each segment window, seconds
    #[serde(default = "default_segment_duration")]
    pub segment_duration_secs: f64,

    /// Overlap carried into the next window, seconds
    #[serde(default)]
    pub overlap_secs: f64,

    /// Overlay asset paths
    #[serde(default)]
    pub overlay: OverlayAssets,

    /// Total attempt bound per retryable unit (1 = no retries)
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,

    /// Worker pool size for this job's segment tasks
    #[serde(default = "default_max_parallel_workers")]
    pub max_parallel_workers: usize,
}

fn default_segment_duration() -> f64 {
    DEFAULT_SEGMENT_DURATION_SECS
}
fn default_max_retry_attempts() -> u32 {
    DEFAULT_MAX_RETRY_ATTEMPTS
}
fn default_max_parallel_workers() -> usize {
    DEFAULT_MAX_PARALLEL_WORKERS
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            segment_duration_secs: DEFAULT_SEGMENT_DURATION_SECS,
            overlap_secs: DEFAULT_OVERLAP_SECS,
            overlay: OverlayAssets::default(),
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            max_parallel_workers: DEFAULT_MAX_PARALLEL_WORKERS,
        }
    }
}

impl JobConfig {
    /// Validate the planning inputs. The planner applies the same checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segment_duration_secs <= 0.0 {
            return Err(ConfigError::NonPositiveDuration(self.segment_duration_secs));
        }
        if self.overlap_secs < 0.0 {
            return Err(ConfigError::NegativeOverlap(self.overlap_secs));
        }
        if self.overlap_secs >= self.segment_duration_secs {
            return Err(ConfigError::OverlapNotBelowDuration {
                overlap: self.overlap_secs,
                duration: self.segment_duration_secs,
            });
        }
        if self.max_parallel_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.max_retry_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }

    /// Step between consecutive window starts.
    pub fn stride_secs(&self) -> f64 {
        self.segment_duration_secs - self.overlap_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(JobConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let config = JobConfig {
            segment_duration_secs: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveDuration(_))
        ));
    }

    #[test]
    fn test_rejects_overlap_at_or_above_duration() {
        let config = JobConfig {
            segment_duration_secs: 30.0,
            overlap_secs: 30.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OverlapNotBelowDuration { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_overlap() {
        let config = JobConfig {
            overlap_secs: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NegativeOverlap(_))));
    }

    #[test]
    fn test_stride() {
        let config = JobConfig {
            segment_duration_secs: 30.0,
            overlap_secs: 5.0,
            ..Default::default()
        };
        assert_eq!(config.stride_secs(), 25.0);
    }
}
