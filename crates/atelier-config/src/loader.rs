use std::path::Path;

use secrecy::SecretString;

use crate::{Config, runway::is_valid_ratio};

/// Environment variable consulted when `runway.api_key` is not configured
pub const API_KEY_ENV_VAR: &str = "RUNWAYML_API_SECRET";

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes, resolves the credential and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Load `path` when it exists, otherwise start from defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file fails to load
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::debug!(path = %path.display(), "no config file found, using defaults");
        Self::default().finish()
    }

    /// Parse configuration from raw TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.finish()
    }

    fn finish(mut self) -> anyhow::Result<Self> {
        self.resolve_credential();
        self.validate()?;
        Ok(self)
    }

    /// Fill in the Runway credential from the environment when unset
    fn resolve_credential(&mut self) {
        if self.runway.credential().is_some() {
            return;
        }

        self.runway.api_key = std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(SecretString::from);

        if self.runway.api_key.is_none() {
            tracing::warn!("{API_KEY_ENV_VAR} is not set, image generation requests will be rejected");
        }
    }

    /// Validate that the configuration is internally consistent
    ///
    /// A missing credential is not a validation error: the service starts and
    /// answers generation requests with "service unavailable".
    ///
    /// # Errors
    ///
    /// Returns an error if durations or default values are malformed
    pub fn validate(&self) -> anyhow::Result<()> {
        let runway = &self.runway;

        let poll_interval = runway.poll_interval()?;
        let max_wait = runway.max_wait()?;
        runway.request_timeout()?;

        if poll_interval.is_zero() {
            anyhow::bail!("runway.poll_interval must be greater than 0");
        }

        if max_wait < poll_interval {
            anyhow::bail!("runway.max_wait must not be shorter than runway.poll_interval");
        }

        if runway.default_model.trim().is_empty() {
            anyhow::bail!("runway.default_model must not be empty");
        }

        if !is_valid_ratio(&runway.default_ratio) {
            anyhow::bail!(
                "runway.default_ratio must look like '<width>:<height>', got '{}'",
                runway.default_ratio
            );
        }

        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        if self.server.health.path == "/" {
            anyhow::bail!("server.health.path must not be '/', the root route is always served");
        }

        Ok(())
    }
}
