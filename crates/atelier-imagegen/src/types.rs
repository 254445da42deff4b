use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a reference image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageContent {
    /// Raw image bytes, sent inline as a data URI
    Embedded { mime_type: String, bytes: Vec<u8> },
    /// Remote image the backend fetches itself
    Url(String),
}

impl ImageContent {
    /// Render the content as the `uri` the backend expects
    pub fn to_uri(&self) -> String {
        match self {
            Self::Embedded { mime_type, bytes } => {
                format!("data:{mime_type};base64,{}", BASE64.encode(bytes))
            }
            Self::Url(url) => url.clone(),
        }
    }
}

/// One reference image, independent of how the client supplied it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub content: ImageContent,
    /// Role of the image in the generation (e.g. "style", "subject")
    pub tag: Option<String>,
}

impl ReferenceImage {
    /// Reference image carried inline
    pub fn embedded(mime_type: impl Into<String>, bytes: Vec<u8>, tag: Option<String>) -> Self {
        Self {
            content: ImageContent::Embedded {
                mime_type: mime_type.into(),
                bytes,
            },
            tag: non_empty(tag),
        }
    }

    /// Reference image the backend downloads
    pub fn url(url: impl Into<String>, tag: Option<String>) -> Self {
        Self {
            content: ImageContent::Url(url.into()),
            tag: non_empty(tag),
        }
    }
}

fn non_empty(tag: Option<String>) -> Option<String> {
    tag.filter(|tag| !tag.is_empty())
}

/// Canonical generation request built from any of the inbound encodings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt_text: String,
    pub model: String,
    /// `<width>:<height>`
    pub ratio: String,
    /// Forwarded to the backend in this order
    pub reference_images: Vec<ReferenceImage>,
}

/// Result of one backend task
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Success { image_url: String },
    /// The task ran and the backend reported it failed; `details` is the
    /// task object exactly as the backend returned it
    TaskFailure { details: Value },
    UnexpectedError { message: String },
    /// The task succeeded but its output carried no image URL
    NotFound,
}

/// `POST /generateimage-json` body
#[derive(Debug, Deserialize)]
pub struct Base64GenerateRequest {
    pub prompt_text: String,
    pub model: Option<String>,
    pub ratio: Option<String>,
    pub reference_images: Option<Vec<Base64ReferenceImage>>,
}

/// Inline reference image; `base64_image` is plain base64, not a data URI
#[derive(Debug, Deserialize)]
pub struct Base64ReferenceImage {
    pub base64_image: String,
    pub tag: Option<String>,
    /// Only used to pick the content type
    pub filename: Option<String>,
}

/// `POST /generateimage-url` body
#[derive(Debug, Deserialize)]
pub struct UrlGenerateRequest {
    pub prompt_text: String,
    pub model: Option<String>,
    pub ratio: Option<String>,
    pub reference_images: Option<Vec<UrlReferenceImage>>,
}

#[derive(Debug, Deserialize)]
pub struct UrlReferenceImage {
    pub url: String,
    pub tag: Option<String>,
}

/// Fields collected from a `POST /generateimage` multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub prompt_text: Option<String>,
    pub model: Option<String>,
    pub ratio: Option<String>,
    /// `reference_image_1` to `reference_image_3`, by slot
    pub slots: [ReferenceSlot; 3],
}

/// One `reference_image_N` file part and its `reference_image_N_tag` field
#[derive(Debug, Default)]
pub struct ReferenceSlot {
    pub file: Option<UploadedFile>,
    pub tag: Option<String>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// What browsers submit for a file input the user never touched
    pub fn is_blank(&self) -> bool {
        self.bytes.is_empty() && self.filename.as_deref().is_none_or(str::is_empty)
    }
}

/// Uniform response body of the three generation endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
