use crate::{
    error::{ImageGenError, Result},
    http_client::http_client,
    normalize::Defaults,
    orchestrator::{self, WaitPolicy},
    provider::{TaskBackend, runway::RunwayBackend},
    types::{GenerationOutcome, GenerationRequest},
};

/// Message returned while no backend credential is configured
const MISSING_CREDENTIAL: &str = "Runway API key not configured";

/// Image generation server holding the backend and request defaults
///
/// Immutable after construction and shared by all requests.
pub struct Server {
    backend: Option<Box<dyn TaskBackend>>,
    wait: WaitPolicy,
    defaults: Defaults,
}

impl Server {
    pub(crate) fn new(backend: Option<Box<dyn TaskBackend>>, wait: WaitPolicy, defaults: Defaults) -> Self {
        Self {
            backend,
            wait,
            defaults,
        }
    }

    /// Values applied when a request omits `model` or `ratio`
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// The configured backend, or a service-unavailable error
    pub fn ensure_configured(&self) -> Result<&dyn TaskBackend> {
        self.backend
            .as_deref()
            .ok_or_else(|| ImageGenError::ServiceUnavailable(MISSING_CREDENTIAL.to_string()))
    }

    /// Submit `request` and wait for its outcome
    ///
    /// Only a missing credential is an error; every backend failure is
    /// reported as a [`GenerationOutcome`].
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let backend = self.ensure_configured()?;

        tracing::info!(
            backend = backend.name(),
            model = %request.model,
            ratio = %request.ratio,
            reference_images = request.reference_images.len(),
            "starting image generation"
        );

        Ok(orchestrator::run(backend, request, self.wait).await)
    }
}

/// Builder for constructing the image generation server from configuration
pub struct ImageGenServerBuilder<'a> {
    config: &'a atelier_config::Config,
}

impl<'a> ImageGenServerBuilder<'a> {
    pub const fn new(config: &'a atelier_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<Server> {
        let runway = &self.config.runway;

        let wait = WaitPolicy {
            poll_interval: runway.poll_interval().map_err(config_error)?,
            max_wait: runway.max_wait().map_err(config_error)?,
        };

        let backend: Option<Box<dyn TaskBackend>> = match runway.credential() {
            Some(api_key) => {
                let client = http_client(runway.request_timeout().map_err(config_error)?)
                    .map_err(|e| ImageGenError::ConfigError(format!("failed to build HTTP client: {e}")))?;

                tracing::debug!(base_url = %runway.base_url, "Runway backend configured");

                Some(Box::new(RunwayBackend::new(
                    client,
                    api_key.clone(),
                    &runway.base_url,
                    runway.api_version.clone(),
                )))
            }
            None => {
                tracing::warn!("no Runway credential configured, generation endpoints will answer 503");
                None
            }
        };

        Ok(Server::new(backend, wait, Defaults::from(runway)))
    }
}

#[allow(clippy::needless_pass_by_value)]
fn config_error(e: anyhow::Error) -> ImageGenError {
    ImageGenError::ConfigError(e.to_string())
}
