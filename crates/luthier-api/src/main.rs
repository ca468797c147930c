use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use luthier_api::{build_router, AppState, ServerConfig};
use luthier_core::{Error, InferenceBackend};
use luthier_db::{Database, PoolConfig};
use luthier_inference::{AnthropicBackend, ImageLoader};
use luthier_pipeline::{ContentPipelineConfig, ImagePipelineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, daily rotation)
    //   LOG_ANSI    - "true"/"false" override ANSI colors
    //   RUST_LOG    - env filter (default below)
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "luthier_api=debug,luthier_pipeline=debug,luthier_inference=info,luthier_db=info,tower_http=debug"
            .into()
    });
    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("luthier-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env();

    let db = Database::connect_with_config(&config.database_url, PoolConfig::from_env()).await?;
    db.migrate().await?;
    info!(subsystem = "db", "Migrations applied");

    // A missing credential is not fatal at startup; the pipeline routes
    // answer 500 until it is configured.
    let inference: Option<Arc<dyn InferenceBackend>> = match AnthropicBackend::from_env() {
        Ok(backend) => {
            info!(
                subsystem = "inference",
                model = backend.model_name(),
                "Inference backend configured"
            );
            Some(Arc::new(backend))
        }
        Err(Error::Config(msg)) => {
            warn!(subsystem = "inference", error = %msg, "Inference backend unavailable");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let image_config = ImagePipelineConfig::from_env();
    let content_config = ContentPipelineConfig::from_env();
    info!(
        vision_model = %image_config.vision_model,
        text_model = %content_config.text_model,
        brand_prior_weight = image_config.prior.weight,
        brand_strong_evidence = image_config.prior.strong_evidence,
        extract_concurrency = content_config.concurrency,
        "Pipeline configuration loaded"
    );

    let state = AppState::new(
        inference,
        Arc::new(db.seed_instruments.clone()),
        ImageLoader::from_env()?,
    )
    .with_image_config(image_config)
    .with_content_config(content_config)
    .with_max_body_size(config.max_body_size);

    let app = build_router(state);

    let addr = config.socket_addr()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
