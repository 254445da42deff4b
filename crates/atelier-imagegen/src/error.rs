use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Errors that reject a generation request at the HTTP boundary
///
/// Everything that happens once a request reaches the backend is reported
/// through [`crate::GenerateImageResponse`] instead.
#[derive(Debug, Error)]
pub enum ImageGenError {
    /// Client sent a malformed or invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Body was not sent with the content type the endpoint expects
    #[error("Unsupported Content-Type, expected: '{0}'")]
    UnsupportedMediaType(&'static str),

    /// Body exceeded the endpoint's size limit
    #[error("Request body is too large, limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// Backend credential is not configured
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Configuration error detected while building the server
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ImageGenError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string for the response
    pub fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) | Self::UnsupportedMediaType(_) | Self::PayloadTooLarge(_) => {
                "invalid_request_error"
            }
            Self::ServiceUnavailable(_) => "configuration_error",
            Self::ConfigError(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::ConfigError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

impl IntoResponse for ImageGenError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let Self::ConfigError(ref detail) = self {
            tracing::error!(error = %detail, "image generation misconfigured");
        }

        let error_response = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

/// Failures talking to the task backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request never produced an HTTP response
    #[error("Connection error: {0}")]
    Connection(String),

    /// Backend answered with a non-success status
    #[error("Runway API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Backend answered with a body that does not match its contract
    #[error("Unexpected Runway response: {0}")]
    Decode(String),
}
