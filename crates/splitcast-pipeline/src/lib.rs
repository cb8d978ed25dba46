//! Job orchestration for video segmentation and composition.
//!
//! This crate provides:
//! - The job state machine and its in-memory registry
//! - Segmentation planning with overlap and tail merging
//! - A bounded worker pool for per-segment processing
//! - Classified retry with exponential backoff
//! - Scoped per-job scratch space with sweep-on-startup

pub mod capabilities;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod orchestrator;
pub mod planner;
pub mod registry;
pub mod retry;
pub mod worker;
pub mod workdir;

pub use capabilities::{ArtifactStore, DownloadedSource, FfmpegEngine, MediaEngine};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use executor::JobExecutor;
pub use logging::JobLogger;
pub use orchestrator::Orchestrator;
pub use planner::{plan_segments, MIN_SEGMENT_SECS};
pub use registry::{JobRegistry, RetentionSweeper};
pub use retry::{RetryOutcome, RetryPolicy, Transient};
pub use workdir::JobWorkspace;
