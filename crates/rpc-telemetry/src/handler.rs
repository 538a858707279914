//! # Message Handler
//!
//! Runs once at the end of every RPC call. For each delivered
//! [`EndpointResult`], in order:
//!
//! 1. count the request under its operation name
//! 2. count an error when the status is `error`
//! 3. record the elapsed time, if the call was timed
//! 4. log `"<operation>: <result>"` at the mapped severity, truncated
//! 5. publish a [`FormattedResponse`] with a fresh trace token, then refresh
//!    the subscriber gauge

use crate::events::{EventBroadcaster, FormattedResponse};
use crate::metrics::RpcMetrics;
use crate::trace::generate_trace_id;
use shared_types::{EndpointResult, EndpointStatus};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Log target for per-call lines.
pub const LOG_TARGET: &str = "rpc_server";

const ELLIPSIS: &str = "...";

/// Log level a result is written at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl From<EndpointStatus> for Severity {
    fn from(status: EndpointStatus) -> Self {
        match status {
            EndpointStatus::Debug | EndpointStatus::Info | EndpointStatus::Success => {
                Severity::Info
            }
            EndpointStatus::Error => Severity::Error,
        }
    }
}

/// One call in flight. Created by [`MessageHandler::begin`] and consumed by
/// [`MessageHandler::send_message`].
#[derive(Debug)]
pub struct CallContext {
    operation: String,
    started: Option<Instant>,
}

impl CallContext {
    /// Context with no start time; its result records no duration.
    pub fn untimed(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            started: None,
        }
    }

    fn timed(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            started: Some(Instant::now()),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn is_timed(&self) -> bool {
        self.started.is_some()
    }

    fn elapsed_ms(&self) -> Option<f64> {
        self.started
            .map(|started| started.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Instrumentation shared by every RPC handler.
#[derive(Debug, Clone)]
pub struct MessageHandler {
    metrics: Arc<RpcMetrics>,
    events: EventBroadcaster,
    max_log_message_length: usize,
}

impl MessageHandler {
    pub fn new(
        metrics: Arc<RpcMetrics>,
        events: EventBroadcaster,
        max_log_message_length: usize,
    ) -> Self {
        Self {
            metrics,
            events,
            max_log_message_length,
        }
    }

    pub fn metrics(&self) -> &Arc<RpcMetrics> {
        &self.metrics
    }

    pub fn events(&self) -> &EventBroadcaster {
        &self.events
    }

    /// Start timing a call to `operation`.
    pub fn begin(&self, operation: impl Into<String>) -> CallContext {
        CallContext::timed(operation)
    }

    /// Report progress for a call that is still running. Counts and logs like
    /// a final result but keeps the context open.
    pub fn send_progress(&self, ctx: &CallContext, result: &EndpointResult) -> FormattedResponse {
        self.deliver(ctx.operation(), None, result)
    }

    /// Deliver the final result of a call.
    pub fn send_message(&self, ctx: CallContext, result: &EndpointResult) -> FormattedResponse {
        self.deliver(ctx.operation(), ctx.elapsed_ms(), result)
    }

    fn deliver(
        &self,
        operation: &str,
        elapsed_ms: Option<f64>,
        result: &EndpointResult,
    ) -> FormattedResponse {
        self.metrics.record_request(operation);
        if result.is_error() {
            self.metrics.record_error(operation);
        }
        if let Some(millis) = elapsed_ms {
            self.metrics.observe_duration(operation, millis);
        }

        let line = format!(
            "{operation}: {}",
            truncate(&result.to_string(), self.max_log_message_length)
        );
        match Severity::from(result.status) {
            Severity::Info => {
                info!(target: LOG_TARGET, method = operation, status = %result.status, "{line}")
            }
            Severity::Error => {
                error!(target: LOG_TARGET, method = operation, status = %result.status, "{line}")
            }
        }

        let response = FormattedResponse {
            function_name: operation.to_string(),
            trace_id: generate_trace_id(),
            result: result.clone(),
        };
        self.events.publish(response.clone());
        self.metrics
            .set_active_connections(self.events.subscriber_count());

        response
    }
}

/// Cut `message` to `max` characters, appending `...` when anything was cut.
pub fn truncate(message: &str, max: usize) -> String {
    match message.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &message[..cut]),
        None => message.to_string(),
    }
}
