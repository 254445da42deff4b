use crate::types::{GenerateImageResponse, GenerationOutcome};

/// Error reported when a succeeded task carries no image URL
pub const NO_IMAGE_URL: &str = "No image URL in response";

impl From<GenerationOutcome> for GenerateImageResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        match outcome {
            GenerationOutcome::Success { image_url } => Self {
                success: true,
                image_url: Some(image_url),
                error: None,
            },
            GenerationOutcome::TaskFailure { details } => failure(format!("Runway task failed: {details}")),
            GenerationOutcome::UnexpectedError { message } => failure(message),
            GenerationOutcome::NotFound => failure(NO_IMAGE_URL.to_string()),
        }
    }
}

fn failure(error: String) -> GenerateImageResponse {
    GenerateImageResponse {
        success: false,
        image_url: None,
        error: Some(error),
    }
}
