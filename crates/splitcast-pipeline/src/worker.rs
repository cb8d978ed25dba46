//! Per-segment processing.
//!
//! One task is one unit of retry: extraction and overlay rendering run
//! together, and a retry starts the unit over from the extraction. Each
//! task works inside its own subdirectory of the job workspace, created
//! at dispatch.

use std::path::Path;

use splitcast_media::{MediaError, OverlayConfig};
use splitcast_models::{artifact_file_name, OverlayAssets, SegmentTask};
use tracing::{info, warn};

use crate::capabilities::MediaEngine;
use crate::retry::{RetryOutcome, RetryPolicy};
use crate::workdir::JobWorkspace;

/// Process one planned segment to a terminal state.
///
/// Never returns an error; the outcome is recorded on the task so the
/// orchestrator can aggregate partial failures across the whole job.
#[allow(clippy::too_many_arguments)]
pub async fn process_segment(
    engine: &dyn MediaEngine,
    policy: &RetryPolicy,
    workspace: &JobWorkspace,
    source: &Path,
    assets: &OverlayAssets,
    title: &str,
    task: SegmentTask,
    is_final: bool,
) -> SegmentTask {
    let task = task.running();
    let window = task.window;

    let file_name = artifact_file_name(title, window.index);
    let task_dir = workspace.task_dir(window.index);
    let raw_path = task_dir.join("segment.mp4");
    let rendered_path = task_dir.join(&file_name);

    let mut config = OverlayConfig::new(
        &assets.banner_image,
        &assets.font_file,
        window.display_number(),
        title,
    );
    if is_final {
        config = config.with_end_credit(&assets.end_credit_image, assets.end_credit_secs);
    }

    let op_name = format!("segment {}", window.index);
    let outcome = policy
        .run(&op_name, || {
            let task_dir = task_dir.clone();
            let raw_path = raw_path.clone();
            let rendered_path = rendered_path.clone();
            let config = config.clone();
            async move {
                tokio::fs::create_dir_all(&task_dir).await?;
                engine.extract(source, &window, &raw_path).await?;
                engine.overlay(&raw_path, &config, &rendered_path).await?;
                Ok::<(), MediaError>(())
            }
        })
        .await;

    match outcome {
        RetryOutcome::Success { attempts, .. } => {
            info!(
                index = window.index,
                attempts,
                output = %rendered_path.display(),
                "Segment rendered"
            );
            task.succeeded(rendered_path, attempts)
        }
        RetryOutcome::Failed { error, attempts } => {
            warn!(
                index = window.index,
                attempts,
                "Segment failed: {}", error
            );
            task.failed(error.to_string(), attempts)
        }
    }
}
