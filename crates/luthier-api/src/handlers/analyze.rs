//! `POST /api/v1/analyze-guitar`

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use tracing::info;

use luthier_core::{Error, GuitarAnalysis};
use luthier_pipeline::ImagePipeline;

use super::{parse_json_body, string_array};
use crate::{ApiError, AppState};

/// Identify an instrument from photos.
///
/// # Request Body
/// - `photoUrls`: image URLs to fetch (optional)
/// - `photoBase64`: `data:image/...;base64,` strings, used only when no URL
///   image loads (optional)
///
/// # Returns
/// - 200 OK with the analysis
/// - 400 Bad Request if no photos were sent or none could be loaded
/// - 500 if the inference credential is missing or the reply is unparseable
/// - 502 if the inference service failed
pub async fn analyze_guitar(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GuitarAnalysis>, ApiError> {
    let backend = state.require_inference()?;
    let body = parse_json_body(&body)?;

    let urls = string_array(&body, "photoUrls");
    let inline = string_array(&body, "photoBase64");
    if urls.is_empty() && inline.is_empty() {
        return Err(Error::InvalidInput(
            "No photos provided (send photoUrls or photoBase64)".to_string(),
        )
        .into());
    }

    info!(
        subsystem = "api",
        component = "analyze",
        url_count = urls.len(),
        inline_count = inline.len(),
        "Analyze request received"
    );

    let images = state.images.load(&urls, &inline).await;
    let pipeline = ImagePipeline::new(backend, state.image_config.clone());
    let analysis = pipeline.identify(images).await?;

    Ok(Json(analysis))
}
