//! JSON-RPC method registry and dispatcher.
//!
//! Every method is registered by name at startup as a handler that has
//! already captured its collaborators. The dispatcher looks the name up,
//! runs the handler and hands the outcome to the [`MessageHandler`], so every
//! call (including calls to unknown methods) is counted, logged and
//! broadcast exactly once.

pub mod endpoints;

use crate::domain::error::{ApiError, ApiResult};
use futures::future::BoxFuture;
use rpc_telemetry::MessageHandler;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared_types::EndpointResult;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

pub use endpoints::{register_endpoints, EndpointDeps};

/// Boxed future returned by a registered handler.
pub type RpcFuture = BoxFuture<'static, ApiResult<Value>>;

/// A registered method.
pub type RpcHandler = Arc<dyn Fn(Params) -> RpcFuture + Send + Sync>;

/// Static name → handler table.
#[derive(Default, Clone)]
pub struct RpcRegistry {
    handlers: BTreeMap<&'static str, RpcHandler>,
}

impl RpcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous entry.
    pub fn register<F, Fut>(&mut self, name: &'static str, handler: F) -> &mut Self
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Value>> + Send + 'static,
    {
        let boxed: RpcHandler = Arc::new(move |params| -> RpcFuture { Box::pin(handler(params)) });
        self.handlers.insert(name, boxed);
        self
    }

    pub fn get(&self, name: &str) -> Option<RpcHandler> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }
}

impl std::fmt::Debug for RpcRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}

/// Request parameters, positional (array) or named (object).
#[derive(Debug, Clone, Default)]
pub struct Params(Option<Value>);

impl Params {
    pub fn new(params: Option<Value>) -> Self {
        Self(params)
    }

    /// Parameter at `index` in an array, or field `name` in an object.
    pub fn required<T: DeserializeOwned>(&self, index: usize, name: &str) -> ApiResult<T> {
        let param = self
            .lookup(index, name)
            .ok_or_else(|| ApiError::invalid_params(format!("missing parameter {name}")))?;

        serde_json::from_value(param.clone())
            .map_err(|e| ApiError::invalid_params(format!("invalid parameter {name}: {e}")))
    }

    fn lookup(&self, index: usize, name: &str) -> Option<&Value> {
        match &self.0 {
            Some(Value::Array(items)) => items.get(index),
            Some(Value::Object(fields)) => fields.get(name),
            Some(scalar) if index == 0 => Some(scalar),
            _ => None,
        }
    }
}

/// Runs registered methods under instrumentation.
#[derive(Debug, Clone)]
pub struct RpcDispatcher {
    registry: Arc<RpcRegistry>,
    messages: MessageHandler,
}

/// What a dispatched call produced: the endpoint result that was reported,
/// and the JSON-RPC error to send back if the call failed.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub result: EndpointResult,
    pub error: Option<ApiError>,
}

impl RpcDispatcher {
    pub fn new(registry: RpcRegistry, messages: MessageHandler) -> Self {
        Self {
            registry: Arc::new(registry),
            messages,
        }
    }

    pub fn registry(&self) -> &RpcRegistry {
        &self.registry
    }

    pub fn messages(&self) -> &MessageHandler {
        &self.messages
    }

    /// Run `method` and report its result.
    pub async fn dispatch(&self, method: &str, params: Params) -> DispatchOutcome {
        let ctx = self.messages.begin(method);

        let outcome = match self.registry.get(method) {
            Some(handler) => handler(params).await,
            None => Err(ApiError::method_not_found(method)),
        };

        let (result, error) = match outcome {
            Ok(data) => (EndpointResult::success(data), None),
            Err(e) => (EndpointResult::error(e.message.clone()), Some(e)),
        };

        self.messages.send_message(ctx, &result);
        DispatchOutcome { result, error }
    }
}
