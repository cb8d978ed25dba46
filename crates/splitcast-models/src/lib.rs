//! Shared data models for the Splitcast pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs, their state machine states, and terminal manifests
//! - Segment windows and per-segment task bookkeeping
//! - Job configuration snapshots and their validation
//! - Encoding configuration

pub mod config;
pub mod encoding;
pub mod job;
pub mod segment;
pub mod utils;

// Re-export common types
pub use config::{ConfigError, JobConfig, OverlayAssets};
pub use encoding::EncodingConfig;
pub use job::{Job, JobId, JobResult, JobState};
pub use segment::{SegmentTask, SegmentWindow, TaskStatus};
pub use utils::{artifact_file_name, sanitize_title};
