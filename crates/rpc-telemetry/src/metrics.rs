//! Prometheus metrics for RPC calls.
//!
//! One [`RpcMetrics`] per serving process, owning its own registry:
//!
//! - `rpc_server_request_count{method}`: calls seen
//! - `rpc_server_error_count{method}`: calls that ended in an error
//! - `rpc_server_duration{method}`: call latency in milliseconds
//! - `rpc_server_active_connections`: live event subscribers

use crate::TelemetryError;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::fmt::Write;

/// Latency buckets, in milliseconds.
pub const DURATION_BUCKETS_MS: [f64; 9] = [
    10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0,
];

const METHOD_LABEL: &str = "method";

const REQUEST_COUNT: (&str, &str) = ("rpc_server_request_count", "Total number of RPC requests");
const ERROR_COUNT: (&str, &str) = ("rpc_server_error_count", "Total number of RPC errors");
const DURATION: (&str, &str) = ("rpc_server_duration", "RPC request duration in milliseconds");
const ACTIVE_CONNECTIONS: (&str, &str) = (
    "rpc_server_active_connections",
    "Number of live event subscribers",
);

/// Labelled families and their exposition type. `gather` skips a labelled
/// family until its first child exists, so `render` writes these headers
/// itself when that happens.
const LABELLED_FAMILIES: [((&str, &str), &str); 3] = [
    (REQUEST_COUNT, "counter"),
    (ERROR_COUNT, "counter"),
    (DURATION, "histogram"),
];

/// Request, error, latency and subscriber metrics.
#[derive(Clone)]
pub struct RpcMetrics {
    registry: Registry,
    request_count: IntCounterVec,
    error_count: IntCounterVec,
    duration: HistogramVec,
    active_connections: IntGauge,
}

impl RpcMetrics {
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let request_count = IntCounterVec::new(
            Opts::new(REQUEST_COUNT.0, REQUEST_COUNT.1),
            &[METHOD_LABEL],
        )
        .map_err(metrics_error)?;

        let error_count = IntCounterVec::new(
            Opts::new(ERROR_COUNT.0, ERROR_COUNT.1),
            &[METHOD_LABEL],
        )
        .map_err(metrics_error)?;

        let duration = HistogramVec::new(
            HistogramOpts::new(DURATION.0, DURATION.1)
                .buckets(DURATION_BUCKETS_MS.to_vec()),
            &[METHOD_LABEL],
        )
        .map_err(metrics_error)?;

        let active_connections =
            IntGauge::new(ACTIVE_CONNECTIONS.0, ACTIVE_CONNECTIONS.1).map_err(metrics_error)?;

        registry
            .register(Box::new(request_count.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(error_count.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(duration.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(active_connections.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            request_count,
            error_count,
            duration,
            active_connections,
        })
    }

    pub fn record_request(&self, method: &str) {
        self.request_count.with_label_values(&[method]).inc();
    }

    pub fn record_error(&self, method: &str) {
        self.error_count.with_label_values(&[method]).inc();
    }

    pub fn observe_duration(&self, method: &str, millis: f64) {
        self.duration.with_label_values(&[method]).observe(millis);
    }

    pub fn set_active_connections(&self, count: usize) {
        self.active_connections
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn request_count(&self, method: &str) -> u64 {
        self.request_count.with_label_values(&[method]).get()
    }

    pub fn error_count(&self, method: &str) -> u64 {
        self.error_count.with_label_values(&[method]).get()
    }

    /// Number of durations observed for `method`.
    pub fn duration_samples(&self, method: &str) -> u64 {
        self.duration.with_label_values(&[method]).get_sample_count()
    }

    pub fn active_connections(&self) -> i64 {
        self.active_connections.get()
    }

    /// Prometheus text exposition of every series. Every family appears,
    /// with at least its `# HELP` and `# TYPE` lines, even before its first
    /// observation.
    pub fn render(&self) -> Result<String, TelemetryError> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(metrics_error)?;
        let mut text =
            String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        for ((name, help), kind) in LABELLED_FAMILIES {
            if !families.iter().any(|family| family.get_name() == name) {
                let _ = writeln!(text, "# HELP {name} {help}\n# TYPE {name} {kind}");
            }
        }
        Ok(text)
    }

    /// Drop every labelled series and zero the gauge.
    pub fn reset(&self) {
        self.request_count.reset();
        self.error_count.reset();
        self.duration.reset();
        self.active_connections.set(0);
    }
}

impl std::fmt::Debug for RpcMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcMetrics").finish_non_exhaustive()
    }
}

fn metrics_error(e: prometheus::Error) -> TelemetryError {
    TelemetryError::MetricsInit(e.to_string())
}
