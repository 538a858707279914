//! # Node Configuration
//!
//! Telemetry and gateway settings, both read from the environment.

use api_gateway::GatewayConfig;
use rpc_telemetry::TelemetryConfig;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Logging and instrumentation.
    pub telemetry: TelemetryConfig,
    /// HTTP surface, limits and CORS.
    pub gateway: GatewayConfig,
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            telemetry: TelemetryConfig::from_env(),
            gateway: GatewayConfig::from_env().map_err(|e| ConfigError::Gateway(e.to_string()))?,
        })
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("gateway configuration: {0}")]
    Gateway(String),

    #[error("telemetry configuration: {0}")]
    Telemetry(String),
}
