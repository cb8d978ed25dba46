#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for the segmentation pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeout enforcement
//! - HTTP source download with streaming writes
//! - Duration probing via ffprobe
//! - Segment extraction via stream copy
//! - Branded overlay rendering onto a vertical canvas

pub mod command;
pub mod download;
pub mod error;
pub mod fs_utils;
pub mod overlay;
pub mod probe;
pub mod segment;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use download::download_to_file;
pub use error::{MediaError, MediaResult};
pub use overlay::{apply_overlay, EndCredit, OverlayConfig};
pub use probe::probe_duration;
pub use segment::extract_window;
