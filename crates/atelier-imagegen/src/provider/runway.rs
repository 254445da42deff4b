use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Task, TaskBackend, TaskHandle};
use crate::{error::BackendError, types::GenerationRequest};

/// Header carrying the Runway API version
const VERSION_HEADER: &str = "X-Runway-Version";

/// Runway text-to-image task backend
pub(crate) struct RunwayBackend {
    name: String,
    client: Client,
    api_key: SecretString,
    base_url: String,
    api_version: String,
}

impl RunwayBackend {
    pub fn new(client: Client, api_key: SecretString, base_url: &str, api_version: String) -> Self {
        Self {
            name: "runway".to_string(),
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version,
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(self.api_key.expose_secret())
            .header(VERSION_HEADER, &self.api_version)
    }

    /// Turn a non-success status into [`BackendError::Api`]
    async fn check_status(&self, response: Response) -> Result<Response, BackendError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!(
            backend = %self.name,
            status = %status,
            "Runway API error"
        );

        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Wire format of the text-to-image creation call
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextToImageBody<'a> {
    model: &'a str,
    ratio: &'a str,
    prompt_text: &'a str,
    /// Always sent, even when empty
    reference_images: Vec<ReferenceImageBody<'a>>,
}

#[derive(Serialize)]
struct ReferenceImageBody<'a> {
    uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
}

impl<'a> From<&'a GenerationRequest> for TextToImageBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            model: &request.model,
            ratio: &request.ratio,
            prompt_text: &request.prompt_text,
            reference_images: request
                .reference_images
                .iter()
                .map(|image| ReferenceImageBody {
                    uri: image.content.to_uri(),
                    tag: image.tag.as_deref(),
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct CreatedTask {
    id: String,
}

#[async_trait]
impl TaskBackend for RunwayBackend {
    async fn submit(&self, request: &GenerationRequest) -> Result<TaskHandle, BackendError> {
        let url = format!("{}/text_to_image", self.base_url);

        tracing::debug!(
            backend = %self.name,
            model = %request.model,
            ratio = %request.ratio,
            reference_images = request.reference_images.len(),
            "submitting text-to-image task"
        );

        let response = self
            .authorized(self.client.post(&url))
            .json(&TextToImageBody::from(request))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(backend = %self.name, error = %e, "task submission failed");
                BackendError::Connection(format!("Failed to send request to Runway: {e}"))
            })?;

        let created: CreatedTask = self
            .check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("malformed task creation response: {e}")))?;

        tracing::debug!(backend = %self.name, task_id = %created.id, "task created");

        Ok(TaskHandle(created.id))
    }

    async fn task(&self, handle: &TaskHandle) -> Result<Task, BackendError> {
        let url = format!("{}/tasks/{handle}", self.base_url);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(backend = %self.name, task_id = %handle, error = %e, "task status request failed");
                BackendError::Connection(format!("Failed to fetch Runway task {handle}: {e}"))
            })?;

        let raw: Value = self
            .check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("malformed task status response: {e}")))?;

        Task::from_value(raw)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
