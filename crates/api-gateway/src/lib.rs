//! API Gateway - JSON-RPC, metrics and live-event surface of the intake node.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         API GATEWAY                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /api        GET /ws          GET /metrics   GET /health│
//! │      │               │                  │                    │
//! │      ▼               │                  │                    │
//! │  RpcDispatcher ──► MessageHandler ──► RpcMetrics             │
//! │      │               │                                       │
//! │      │               └──► EventBroadcaster ──► subscribers   │
//! │      ▼                                                       │
//! │  RpcRegistry (ping, create_account, fund_account,            │
//! │               send_transaction, get_transaction_by_id,       │
//! │               send_raw_transaction)                          │
//! │      │                                                       │
//! │      ▼                                                       │
//! │  TransactionAssembler ──► AccountsManager / InMemoryLedger   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use api_gateway::{ApiGatewayService, GatewayConfig};
//!
//! let service = ApiGatewayService::new(GatewayConfig::from_env()?, dispatcher)?;
//! service.serve(shutdown_signal()).await?;
//! ```
//!
//! # Responses
//!
//! Successful calls return `result: {"status":"success","data":…}`. Failed
//! calls return a JSON-RPC `error` whose `data` is the
//! `{"status":"error","message":…}` envelope that was also logged and
//! broadcast.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod rpc;
pub mod service;
pub mod ws;

pub use adapters::{AccountsManager, InMemoryLedger};
pub use domain::config::{
    ConfigError, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, WebSocketConfig,
    DEFAULT_PORT,
};
pub use domain::correlation::ConnectionId;
pub use domain::error::{codes, ApiError, ApiResult, GatewayError};
pub use rpc::{register_endpoints, DispatchOutcome, EndpointDeps, Params, RpcDispatcher, RpcRegistry};
pub use service::ApiGatewayService;
pub use ws::LiveEventsHandler;
