//! Axum API server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use splitcast_pipeline::{FfmpegEngine, JobWorkspace, PipelineConfig, RetentionSweeper};
use splitcast_storage::S3Client;

use splitcast_api::{create_router, ApiConfig, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("splitcast=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting splitcast-api");

    // Load configuration
    let config = ApiConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    info!("API config: host={}, port={}", config.host, config.port);

    // Sweep work-dir leftovers from a previous process
    match JobWorkspace::sweep_base(&pipeline_config.work_dir).await {
        Ok(0) => {}
        Ok(swept) => info!(swept, "Removed stale work-dir entries from previous run"),
        Err(e) => warn!("Work-dir sweep failed: {}", e),
    }

    // Wire up storage and the media engine
    let store = match S3Client::from_env().await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create storage client: {}", e);
            std::process::exit(1);
        }
    };
    let engine = Arc::new(FfmpegEngine::new(&pipeline_config));

    let retention = pipeline_config.job_retention;
    let sweep_interval = pipeline_config.retention_sweep_interval;

    let state = AppState::new(config.clone(), pipeline_config, engine, store);

    // Start the job retention sweeper background task
    let sweeper = RetentionSweeper::new(state.registry.clone(), retention, sweep_interval);
    tokio::spawn(async move {
        sweeper.run().await;
    });

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid bind address");

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Received shutdown signal");
}
