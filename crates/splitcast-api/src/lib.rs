//! Axum HTTP API server.
//!
//! This crate provides:
//! - Job submission and status polling endpoints
//! - Liveness and readiness probes
//! - Wiring between the HTTP surface and the segmentation pipeline

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
