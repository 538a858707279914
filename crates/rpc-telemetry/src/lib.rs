//! # RPC Telemetry
//!
//! Instrumentation applied to every RPC call.
//!
//! ## Components
//!
//! - **Metrics**: [`RpcMetrics`], a Prometheus registry with request, error,
//!   latency and subscriber series
//! - **Logs**: one line per call on the `rpc_server` target, plus
//!   [`init_logging`] for the process-wide subscriber
//! - **Events**: [`EventBroadcaster`] fans every call's outcome out to live
//!   subscribers
//! - **Pipeline**: [`MessageHandler`] ties the three together
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//!
//! let metrics = Arc::new(RpcMetrics::new()?);
//! let handler = MessageHandler::new(
//!     metrics,
//!     EventBroadcaster::new(config.event_channel_capacity),
//!     config.max_log_message_length,
//! );
//!
//! let ctx = handler.begin("ping");
//! handler.send_message(ctx, &EndpointResult::success(json!({"status": "OK"})));
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `rpc-intake` | Service name in logs |
//! | `RPC_LOG_LEVEL` | `info` | Log level filter |
//! | `RPC_JSON_LOGS` | `false` | JSON log output |
//! | `RPC_MAX_LOG_MESSAGE_LENGTH` | `3000` | Log truncation limit |
//! | `RPC_EVENT_CHANNEL_CAPACITY` | `1024` | Live event buffer |

mod config;
mod events;
mod handler;
mod logging;
mod metrics;
mod trace;

pub use config::{TelemetryConfig, DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_MAX_LOG_MESSAGE_LENGTH};
pub use events::{EventBroadcaster, FormattedResponse, LiveEvent, STATUS_UPDATE_EVENT};
pub use handler::{truncate, CallContext, MessageHandler, Severity, LOG_TARGET};
pub use logging::init_logging;
pub use metrics::{RpcMetrics, DURATION_BUCKETS_MS};
pub use trace::{generate_trace_id, TRACE_ID_ALPHABET, TRACE_ID_LEN};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
