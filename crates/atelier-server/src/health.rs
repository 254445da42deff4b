use axum::{Json, response::IntoResponse};
use http::StatusCode;
use serde::Serialize;

#[derive(Serialize)]
struct Banner {
    message: &'static str,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

/// Root handler confirming the service is up
pub async fn root_handler() -> impl IntoResponse {
    Json(Banner {
        message: "Image Generation API is running",
    })
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(Health { status: "healthy" }))
}
