#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod content_type;
mod error;
mod extract;
mod http_client;
mod normalize;
mod orchestrator;
mod provider;
mod request;
mod response;
mod server;
mod types;

use std::sync::Arc;

use axum::{Json, Router, extract::DefaultBodyLimit, extract::State, routing::post};

pub use error::{ImageGenError, Result};
pub use normalize::{Defaults, MAX_REFERENCE_IMAGES};
pub use request::BODY_LIMIT_BYTES;
pub use server::{ImageGenServerBuilder, Server};
pub use types::{
    Base64GenerateRequest, Base64ReferenceImage, GenerateImageResponse, GenerationOutcome, GenerationRequest,
    ImageContent, ReferenceImage, UrlGenerateRequest, UrlReferenceImage,
};

use request::{ExtractMultipart, ExtractPayload};

/// Build the image generation server from configuration
///
/// # Errors
///
/// Returns an error if the server fails to initialize
pub fn build_server(config: &atelier_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        ImageGenServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize image generation server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for image generation
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new()
        .route("/generateimage", post(generate_from_upload))
        .route("/generateimage-json", post(generate_from_base64))
        .route("/generateimage-url", post(generate_from_urls))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

/// Multipart form with up to three uploaded reference images
async fn generate_from_upload(
    State(server): State<Arc<Server>>,
    ExtractMultipart(form): ExtractMultipart,
) -> Result<Json<GenerateImageResponse>> {
    server.ensure_configured()?;

    let request = normalize::from_upload(form, server.defaults())?;
    respond(&server, &request).await
}

/// JSON body with base64-encoded reference images
async fn generate_from_base64(
    State(server): State<Arc<Server>>,
    ExtractPayload(body): ExtractPayload<Base64GenerateRequest>,
) -> Result<Json<GenerateImageResponse>> {
    server.ensure_configured()?;

    let request = normalize::from_base64_json(body, server.defaults())?;
    respond(&server, &request).await
}

/// JSON body with reference images given by URL
async fn generate_from_urls(
    State(server): State<Arc<Server>>,
    ExtractPayload(body): ExtractPayload<UrlGenerateRequest>,
) -> Result<Json<GenerateImageResponse>> {
    server.ensure_configured()?;

    let request = normalize::from_url_json(body, server.defaults())?;
    respond(&server, &request).await
}

async fn respond(server: &Server, request: &GenerationRequest) -> Result<Json<GenerateImageResponse>> {
    let outcome = server.generate(request).await?;

    tracing::debug!(success = matches!(outcome, GenerationOutcome::Success { .. }), "image generation complete");

    Ok(Json(GenerateImageResponse::from(outcome)))
}
