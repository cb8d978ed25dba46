//! Segmentation planning.
//!
//! Turns a probed source duration and a job configuration into the list of
//! segment tasks the workers will process. Windows advance by
//! `segment_duration - overlap` so consecutive segments share `overlap`
//! seconds of footage.

use splitcast_models::{ConfigError, JobConfig, SegmentTask, SegmentWindow};
use tracing::debug;

/// Windows shorter than this are merged into their predecessor.
pub const MIN_SEGMENT_SECS: f64 = 1.0;

/// Guards against float drift emitting a zero-length window at the source
/// boundary.
const PLAN_EPSILON: f64 = 1e-9;

/// Plan the segment windows for a source of the given duration.
///
/// The final window is clamped to the source duration. A clamped tail
/// shorter than [`MIN_SEGMENT_SECS`] is folded into the previous window,
/// which may then exceed the nominal segment duration. A source shorter
/// than the minimum still yields one window covering all of it.
pub fn plan_segments(
    source_duration: f64,
    config: &JobConfig,
) -> Result<Vec<SegmentTask>, ConfigError> {
    config.validate()?;

    if source_duration <= 0.0 {
        return Err(ConfigError::NonPositiveSourceDuration(source_duration));
    }

    let duration = config.segment_duration_secs;
    let stride = config.stride_secs();

    let mut windows: Vec<SegmentWindow> = Vec::new();
    let mut start = 0.0;

    while start < source_duration - PLAN_EPSILON {
        let end = (start + duration).min(source_duration);
        windows.push(SegmentWindow::new(windows.len(), start, end));
        start += stride;
    }

    if windows.len() > 1 {
        let tail = windows.last().expect("windows not empty");
        if tail.duration() < MIN_SEGMENT_SECS {
            let tail_end = tail.end;
            windows.pop();
            let prev = windows.last_mut().expect("previous window exists");
            prev.end = tail_end;
            debug!(
                merged_into = prev.index,
                end = prev.end,
                "Folded short tail window into its predecessor"
            );
        }
    }

    debug!(
        source_duration,
        segment_duration = duration,
        overlap = config.overlap_secs,
        count = windows.len(),
        "Planned segment windows"
    );

    Ok(windows.into_iter().map(SegmentTask::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(duration: f64, overlap: f64) -> JobConfig {
        JobConfig {
            segment_duration_secs: duration,
            overlap_secs: overlap,
            ..JobConfig::default()
        }
    }

    fn windows(tasks: &[SegmentTask]) -> Vec<(f64, f64)> {
        tasks.iter().map(|t| (t.window.start, t.window.end)).collect()
    }

    fn approx(actual: &[(f64, f64)], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len(), "window count mismatch");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a.0 - e.0).abs() < 1e-9, "start {} != {}", a.0, e.0);
            assert!((a.1 - e.1).abs() < 1e-9, "end {} != {}", a.1, e.1);
        }
    }

    #[test]
    fn test_overlapping_windows() {
        let tasks = plan_segments(125.0, &config(30.0, 5.0)).unwrap();

        approx(
            &windows(&tasks),
            &[
                (0.0, 30.0),
                (25.0, 55.0),
                (50.0, 80.0),
                (75.0, 105.0),
                (100.0, 125.0),
            ],
        );

        for (i, task) in tasks.iter().enumerate() {
            assert_eq!(task.window.index, i);
        }
    }

    #[test]
    fn test_exact_multiple_has_no_tail() {
        let tasks = plan_segments(120.0, &config(30.0, 0.0)).unwrap();
        approx(
            &windows(&tasks),
            &[(0.0, 30.0), (30.0, 60.0), (60.0, 90.0), (90.0, 120.0)],
        );
    }

    #[test]
    fn test_source_shorter_than_segment() {
        let tasks = plan_segments(10.0, &config(30.0, 0.0)).unwrap();
        approx(&windows(&tasks), &[(0.0, 10.0)]);
    }

    #[test]
    fn test_tiny_source_kept_as_only_window() {
        let tasks = plan_segments(0.5, &config(30.0, 0.0)).unwrap();
        approx(&windows(&tasks), &[(0.0, 0.5)]);
    }

    #[test]
    fn test_short_tail_folds_into_previous() {
        let tasks = plan_segments(100.5, &config(25.0, 0.0)).unwrap();
        approx(
            &windows(&tasks),
            &[(0.0, 25.0), (25.0, 50.0), (50.0, 75.0), (75.0, 100.5)],
        );
    }

    #[test]
    fn test_overlap_must_be_below_duration() {
        let result = plan_segments(100.0, &config(30.0, 30.0));
        assert!(matches!(
            result,
            Err(ConfigError::OverlapNotBelowDuration { .. })
        ));
    }

    #[test]
    fn test_negative_overlap_rejected() {
        let result = plan_segments(100.0, &config(30.0, -1.0));
        assert!(matches!(result, Err(ConfigError::NegativeOverlap(_))));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = plan_segments(100.0, &config(0.0, 0.0));
        assert!(matches!(result, Err(ConfigError::NonPositiveDuration(_))));
    }

    #[test]
    fn test_zero_source_rejected() {
        let result = plan_segments(0.0, &config(30.0, 0.0));
        assert!(matches!(
            result,
            Err(ConfigError::NonPositiveSourceDuration(_))
        ));
    }
}
