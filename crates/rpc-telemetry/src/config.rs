//! Telemetry configuration from environment variables.

use std::env;

/// Default cap on the length of a logged call result, in characters.
pub const DEFAULT_MAX_LOG_MESSAGE_LENGTH: usize = 3000;

/// Default number of buffered live events per subscriber.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Logging and instrumentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to log output
    pub service_name: String,

    /// Log level filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` expression)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Longest call result written to the log before truncation
    pub max_log_message_length: usize,

    /// Live event channel capacity; slow subscribers lag past this
    pub event_channel_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "rpc-intake".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            max_log_message_length: DEFAULT_MAX_LOG_MESSAGE_LENGTH,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: rpc-intake)
    /// - `RPC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `RPC_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `RPC_MAX_LOG_MESSAGE_LENGTH`: Log truncation limit (default: 3000)
    /// - `RPC_EVENT_CHANNEL_CAPACITY`: Live event buffer (default: 1024)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "rpc-intake".to_string()),

            log_level: env::var("RPC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("RPC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            max_log_message_length: env::var("RPC_MAX_LOG_MESSAGE_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_MAX_LOG_MESSAGE_LENGTH),

            event_channel_capacity: env::var("RPC_EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_EVENT_CHANNEL_CAPACITY),
        }
    }
}
