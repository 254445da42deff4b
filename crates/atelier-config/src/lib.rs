#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod runway;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use loader::API_KEY_ENV_VAR;
pub use runway::*;
pub use server::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level Atelier configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Runway backend configuration
    #[serde(default)]
    pub runway: RunwayConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
