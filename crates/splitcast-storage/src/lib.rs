//! Object storage client for published segments.
//!
//! This crate provides:
//! - File upload to any S3-compatible bucket
//! - Public URL construction for published objects
//! - Connectivity checks for readiness probes

pub mod client;
pub mod error;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
