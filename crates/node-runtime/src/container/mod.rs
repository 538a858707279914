//! # Node Container
//!
//! Builds every long-lived component once and hands out shared handles.

pub mod config;

pub use config::{ConfigError, NodeConfig};

use api_gateway::{
    register_endpoints, AccountsManager, ApiGatewayService, EndpointDeps, InMemoryLedger,
    RpcDispatcher, RpcRegistry,
};
use rpc_telemetry::{EventBroadcaster, MessageHandler, RpcMetrics};
use std::sync::Arc;
use tracing::info;

/// Shared components of a running node.
pub struct NodeContainer {
    /// Known accounts and balances.
    pub accounts: Arc<AccountsManager>,
    /// Transaction records.
    pub ledger: Arc<InMemoryLedger>,
    /// Prometheus series for every RPC call.
    pub metrics: Arc<RpcMetrics>,
    /// Live status event fan-out.
    pub events: EventBroadcaster,
    /// HTTP surface.
    pub gateway: ApiGatewayService,
}

impl NodeContainer {
    pub fn new(config: NodeConfig) -> Result<Self, ConfigError> {
        let accounts = Arc::new(AccountsManager::new());
        let ledger = Arc::new(InMemoryLedger::new());

        let metrics = Arc::new(
            RpcMetrics::new().map_err(|e| ConfigError::Telemetry(e.to_string()))?,
        );
        let events = EventBroadcaster::new(config.telemetry.event_channel_capacity);
        let messages = MessageHandler::new(
            Arc::clone(&metrics),
            events.clone(),
            config.telemetry.max_log_message_length,
        );

        let mut registry = RpcRegistry::new();
        register_endpoints(
            &mut registry,
            EndpointDeps::in_memory(
                Arc::clone(&accounts),
                Arc::clone(&ledger),
                config.gateway.limits.max_raw_transaction_size,
            ),
        );
        info!(methods = ?registry.methods(), "RPC methods registered");

        let gateway = ApiGatewayService::new(config.gateway, RpcDispatcher::new(registry, messages))
            .map_err(|e| ConfigError::Gateway(e.to_string()))?;

        Ok(Self {
            accounts,
            ledger,
            metrics,
            events,
            gateway,
        })
    }
}
