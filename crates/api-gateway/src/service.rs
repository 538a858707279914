//! API Gateway service: the axum router and server loop.
//!
//! Routes:
//! - `POST <api_path>`: JSON-RPC 2.0, single or batch
//! - `GET <ws_path>`: live status events
//! - `GET /metrics`: Prometheus text exposition
//! - `GET /health`

use crate::domain::config::{GatewayConfig, LimitsConfig};
use crate::domain::error::{ApiError, GatewayError};
use crate::middleware::create_cors_layer;
use crate::rpc::{Params, RpcDispatcher};
use crate::ws::LiveEventsHandler;
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

/// Content type of the Prometheus text format.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Longest accepted string request id.
const MAX_ID_LENGTH: usize = 256;

/// API Gateway service
pub struct ApiGatewayService {
    config: GatewayConfig,
    dispatcher: Arc<RpcDispatcher>,
}

impl ApiGatewayService {
    pub fn new(config: GatewayConfig, dispatcher: RpcDispatcher) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            config,
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<RpcDispatcher> {
        &self.dispatcher
    }

    /// Build the full router.
    pub fn router(&self) -> Router {
        let state = AppState {
            dispatcher: Arc::clone(&self.dispatcher),
            limits: self.config.limits.clone(),
            max_ws_message_size: self.config.websocket.max_message_size,
        };

        Router::new()
            .route(&self.config.http.api_path, post(handle_json_rpc))
            .route(&self.config.websocket.path, get(live_events))
            .route("/metrics", get(render_metrics))
            .route("/health", get(health_check))
            // CORS stays outermost; applied separately so the limit layer's
            // response body is converted to `Body` before CORS wraps it.
            .layer(RequestBodyLimitLayer::new(self.config.limits.max_request_size))
            .layer(create_cors_layer(&self.config.cors))
            .with_state(state)
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;

        info!(
            %addr,
            api = %self.config.http.api_path,
            ws = %self.config.websocket.path,
            methods = ?self.dispatcher.registry().methods(),
            "RPC server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                error!(error = %e, "RPC server failed");
                GatewayError::Serve(e.to_string())
            })?;

        info!("RPC server stopped");
        Ok(())
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    dispatcher: Arc<RpcDispatcher>,
    limits: LimitsConfig,
    max_ws_message_size: usize,
}

/// Handle JSON-RPC request
async fn handle_json_rpc(State(state): State<AppState>, body: String) -> impl IntoResponse {
    let request: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(failure(Value::Null, &ApiError::parse_error(e.to_string()))),
            );
        }
    };

    let response = match request {
        Value::Array(requests) if requests.is_empty() => {
            failure(Value::Null, &ApiError::invalid_request("empty batch"))
        }
        Value::Array(requests) if requests.len() > state.limits.max_batch_size => failure(
            Value::Null,
            &ApiError::limit_exceeded(format!(
                "batch of {} requests, max {}",
                requests.len(),
                state.limits.max_batch_size
            )),
        ),
        Value::Array(requests) => {
            let mut responses = Vec::with_capacity(requests.len());
            for request in &requests {
                responses.push(process_single_request(&state, request).await);
            }
            Value::Array(responses)
        }
        single => process_single_request(&state, &single).await,
    };

    (StatusCode::OK, Json(response))
}

/// Process a single JSON-RPC request
async fn process_single_request(state: &AppState, request: &Value) -> Value {
    let id = request.get("id").cloned();
    if let Some(id) = &id {
        if let Err(e) = validate_id(id) {
            return failure(Value::Null, &e);
        }
    }
    let id = id.unwrap_or(Value::Null);

    let Some(method) = request.get("method").and_then(Value::as_str) else {
        return failure(id, &ApiError::invalid_request("missing method"));
    };
    let params = Params::new(request.get("params").cloned());

    let outcome = state.dispatcher.dispatch(method, params).await;
    match outcome.error {
        None => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": outcome.result,
        }),
        Some(e) => {
            let envelope = serde_json::to_value(&outcome.result).unwrap_or(Value::Null);
            failure(id, &e.with_data(envelope))
        }
    }
}

/// Null ids are notifications, which are not supported.
fn validate_id(id: &Value) -> Result<(), ApiError> {
    match id {
        Value::Null => Err(ApiError::invalid_request(
            "null id (notifications not supported)",
        )),
        Value::String(s) if s.is_empty() => Err(ApiError::invalid_request("empty string id")),
        Value::String(s) if s.len() > MAX_ID_LENGTH => Err(ApiError::invalid_request(format!(
            "id string too long (max {MAX_ID_LENGTH} chars)"
        ))),
        Value::String(_) | Value::Number(_) => Ok(()),
        _ => Err(ApiError::invalid_request("id must be string or number")),
    }
}

fn failure(id: Value, error: &ApiError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": error,
    })
}

async fn live_events(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let messages = state.dispatcher.messages();
    let handler = LiveEventsHandler::new(messages.events().clone(), Arc::clone(messages.metrics()));

    ws.max_message_size(state.max_ws_message_size)
        .on_upgrade(move |socket| handler.handle(socket))
}

async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.dispatcher.messages().metrics().render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            body,
        ),
        Err(e) => {
            error!(error = %e, "metrics rendering failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                e.to_string(),
            )
        }
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "api-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
