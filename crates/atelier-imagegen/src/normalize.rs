//! Conversion of the three inbound encodings into one [`GenerationRequest`]

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::{
    content_type,
    error::{ImageGenError, Result},
    types::{Base64GenerateRequest, GenerationRequest, ReferenceImage, UploadForm, UrlGenerateRequest},
};

/// Maximum number of reference images forwarded to the backend
pub const MAX_REFERENCE_IMAGES: usize = 3;

/// Values applied when a request leaves `model` or `ratio` out
#[derive(Debug, Clone)]
pub struct Defaults {
    pub model: String,
    pub ratio: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            model: atelier_config::DEFAULT_MODEL.to_string(),
            ratio: atelier_config::DEFAULT_RATIO.to_string(),
        }
    }
}

impl From<&atelier_config::RunwayConfig> for Defaults {
    fn from(config: &atelier_config::RunwayConfig) -> Self {
        Self {
            model: config.default_model.clone(),
            ratio: config.default_ratio.clone(),
        }
    }
}

/// Normalize a multipart upload
///
/// Files are embedded in slot order; empty slots are skipped.
pub fn from_upload(form: UploadForm, defaults: &Defaults) -> Result<GenerationRequest> {
    let prompt_text = form.prompt_text.ok_or_else(|| {
        ImageGenError::InvalidRequest("Missing required 'prompt_text' field in multipart form".to_string())
    })?;

    let reference_images = form
        .slots
        .into_iter()
        .filter_map(|slot| {
            let file = slot.file.filter(|file| !file.is_blank())?;
            let mime_type = content_type::resolve(file.filename.as_deref());
            Some(ReferenceImage::embedded(mime_type, file.bytes, slot.tag))
        })
        .collect();

    build(prompt_text, form.model, form.ratio, reference_images, defaults)
}

/// Normalize a JSON body carrying base64 images
///
/// Each entry is decoded up front; a payload that is not valid base64 rejects
/// the whole request.
pub fn from_base64_json(body: Base64GenerateRequest, defaults: &Defaults) -> Result<GenerationRequest> {
    let reference_images = body
        .reference_images
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, image)| {
            let bytes = decode_base64(&image.base64_image).map_err(|e| {
                ImageGenError::InvalidRequest(format!("reference_images[{index}].base64_image is not valid base64: {e}"))
            })?;
            let mime_type = content_type::resolve(image.filename.as_deref());
            Ok(ReferenceImage::embedded(mime_type, bytes, image.tag))
        })
        .collect::<Result<Vec<_>>>()?;

    build(body.prompt_text, body.model, body.ratio, reference_images, defaults)
}

/// Decode standard base64, ignoring whitespace such as the line breaks
/// `base64` inserts every 76 characters
fn decode_base64(encoded: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64.decode(cleaned)
}

/// Normalize a JSON body carrying image URLs
///
/// URLs are forwarded as given; the backend fetches them.
pub fn from_url_json(body: UrlGenerateRequest, defaults: &Defaults) -> Result<GenerationRequest> {
    let reference_images = body
        .reference_images
        .unwrap_or_default()
        .into_iter()
        .map(|image| ReferenceImage::url(image.url, image.tag))
        .collect();

    build(body.prompt_text, body.model, body.ratio, reference_images, defaults)
}

fn build(
    prompt_text: String,
    model: Option<String>,
    ratio: Option<String>,
    reference_images: Vec<ReferenceImage>,
    defaults: &Defaults,
) -> Result<GenerationRequest> {
    if prompt_text.trim().is_empty() {
        return Err(ImageGenError::InvalidRequest("prompt_text must not be empty".to_string()));
    }

    if reference_images.len() > MAX_REFERENCE_IMAGES {
        return Err(ImageGenError::InvalidRequest(format!(
            "at most {MAX_REFERENCE_IMAGES} reference images are supported, got {}",
            reference_images.len()
        )));
    }

    Ok(GenerationRequest {
        prompt_text,
        model: or_default(model, &defaults.model),
        ratio: or_default(ratio, &defaults.ratio),
        reference_images,
    })
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
