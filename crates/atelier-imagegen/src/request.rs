use axum::{
    body::Body,
    extract::{FromRequest, Multipart, multipart::Field},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::{
    error::ImageGenError,
    types::{UploadForm, UploadedFile},
};

/// Body limit for generation requests (32 MiB), sized for inline images
pub const BODY_LIMIT_BYTES: usize = 32 << 20;

/// Extractor for JSON request bodies
pub struct ExtractPayload<T>(pub T);

impl<S, T: DeserializeOwned> FromRequest<S> for ExtractPayload<T>
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        if !has_content_type(&parts.headers, "application/json") {
            return Err(ImageGenError::UnsupportedMediaType("Content-Type: application/json").into_response());
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                ImageGenError::PayloadTooLarge(BODY_LIMIT_BYTES)
            } else {
                ImageGenError::InvalidRequest(format!("Failed to read request body: {err}"))
            }
            .into_response()
        })?;

        let body = serde_json::from_slice::<T>(&bytes).map_err(|e| {
            ImageGenError::InvalidRequest(format!("Failed to parse request body: {e}")).into_response()
        })?;

        Ok(Self(body))
    }
}

/// Extractor for the multipart generation form
///
/// Collects the scalar fields and the three reference image slots; unknown
/// fields are ignored.
pub struct ExtractMultipart(pub UploadForm);

impl<S> FromRequest<S> for ExtractMultipart
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: http::Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        if !has_content_type(request.headers(), "multipart/form-data") {
            return Err(ImageGenError::UnsupportedMediaType("Content-Type: multipart/form-data").into_response());
        }

        let mut multipart = Multipart::from_request(request, state).await.map_err(|e| {
            ImageGenError::InvalidRequest(format!("Failed to parse multipart form: {e}")).into_response()
        })?;

        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "prompt_text" => form.prompt_text = Some(read_text(field, &name).await?),
                "model" => form.model = Some(read_text(field, &name).await?),
                "ratio" => form.ratio = Some(read_text(field, &name).await?),
                other => match slot_field(other) {
                    Some((index, SlotField::File)) => {
                        let filename = field.file_name().map(str::to_string);
                        let bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
                        form.slots[index].file = Some(UploadedFile { filename, bytes });
                    }
                    Some((index, SlotField::Tag)) => {
                        form.slots[index].tag = Some(read_text(field, &name).await?);
                    }
                    None => tracing::trace!(field = %other, "ignoring unknown form field"),
                },
            }
        }

        Ok(Self(form))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SlotField {
    File,
    Tag,
}

/// Map `reference_image_N` / `reference_image_N_tag` to a zero-based slot
fn slot_field(name: &str) -> Option<(usize, SlotField)> {
    let rest = name.strip_prefix("reference_image_")?;
    let (number, kind) = match rest.strip_suffix("_tag") {
        Some(number) => (number, SlotField::Tag),
        None => (rest, SlotField::File),
    };

    match number {
        "1" => Some((0, kind)),
        "2" => Some((1, kind)),
        "3" => Some((2, kind)),
        _ => None,
    }
}

async fn read_text(field: Field<'_>, name: &str) -> Result<String, Response> {
    field.text().await.map_err(|e| {
        ImageGenError::InvalidRequest(format!("Failed to read {name} field: {e}")).into_response()
    })
}

#[allow(clippy::needless_pass_by_value)]
fn multipart_error(e: axum::extract::multipart::MultipartError) -> Response {
    if e.status() == http::StatusCode::PAYLOAD_TOO_LARGE {
        return ImageGenError::PayloadTooLarge(BODY_LIMIT_BYTES).into_response();
    }

    ImageGenError::InvalidRequest(format!("Failed to read multipart form: {}", e.body_text())).into_response()
}

fn has_content_type(headers: &http::HeaderMap, expected: &str) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with(expected))
}
