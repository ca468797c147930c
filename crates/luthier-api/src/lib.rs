//! # luthier-api
//!
//! HTTP surface for the luthier pipelines.
//!
//! | Route | Methods |
//! |-------|---------|
//! | `/health` | GET |
//! | `/api/v1/analyze-guitar` | POST, OPTIONS |
//! | `/api/v1/extract-content` | POST, OPTIONS |

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use luthier_core::defaults::MAX_BODY_SIZE_BYTES;
use luthier_core::{Error, InferenceBackend, RecordSink};
use luthier_inference::ImageLoader;
use luthier_pipeline::{ContentPipelineConfig, ImagePipelineConfig};

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no inference credential is configured; pipeline routes
    /// then answer 500.
    pub inference: Option<Arc<dyn InferenceBackend>>,
    pub sink: Arc<dyn RecordSink>,
    pub images: ImageLoader,
    pub image_config: ImagePipelineConfig,
    pub content_config: ContentPipelineConfig,
    pub max_body_size: usize,
}

impl AppState {
    pub fn new(
        inference: Option<Arc<dyn InferenceBackend>>,
        sink: Arc<dyn RecordSink>,
        images: ImageLoader,
    ) -> Self {
        Self {
            inference,
            sink,
            images,
            image_config: ImagePipelineConfig::default(),
            content_config: ContentPipelineConfig::default(),
            max_body_size: MAX_BODY_SIZE_BYTES,
        }
    }

    pub fn with_image_config(mut self, config: ImagePipelineConfig) -> Self {
        self.image_config = config;
        self
    }

    pub fn with_content_config(mut self, config: ContentPipelineConfig) -> Self {
        self.content_config = config;
        self
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// The inference backend, or the configuration error every pipeline
    /// route reports before looking at the request.
    pub fn require_inference(&self) -> Result<Arc<dyn InferenceBackend>, ApiError> {
        self.inference.clone().ok_or_else(|| {
            Error::Config("ANTHROPIC_API_KEY not configured".to_string()).into()
        })
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// CORS policy shared by the pipeline routes.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let max_body_size = state.max_body_size;

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/v1/analyze-guitar",
            post(handlers::analyze::analyze_guitar)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/v1/extract-content",
            post(handlers::extract::extract_content)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer())
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Plain OPTIONS without CORS request headers.
async fn preflight() -> &'static str {
    "ok"
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
