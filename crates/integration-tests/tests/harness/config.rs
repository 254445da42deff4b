//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use atelier_config::{Config, RunwayConfig};
use secrecy::SecretString;

/// Key the mock backend expects in the `Authorization` header
pub const TEST_API_KEY: &str = "key_test_123";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal defaults: loopback address, health enabled, no credential
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));

        Self { config }
    }

    /// Point the Runway backend at a mock, polling every 10ms
    pub fn with_runway(mut self, base_url: &str) -> Self {
        self.config.runway = RunwayConfig {
            api_key: Some(SecretString::from(TEST_API_KEY)),
            base_url: base_url.to_owned(),
            poll_interval: "10ms".to_owned(),
            max_wait: "5s".to_owned(),
            request_timeout: "5s".to_owned(),
            ..RunwayConfig::default()
        };
        self
    }

    /// Drop any configured credential
    pub fn without_credential(mut self) -> Self {
        self.config.runway.api_key = None;
        self
    }

    /// Override the fallback model and ratio
    pub fn with_defaults(mut self, model: &str, ratio: &str) -> Self {
        self.config.runway.default_model = model.to_owned();
        self.config.runway.default_ratio = ratio.to_owned();
        self
    }

    /// Serve the health check on another path
    pub fn with_health_path(mut self, path: &str) -> Self {
        self.config.server.health.path = path.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
