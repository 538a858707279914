//! # Intake Node Runtime
//!
//! Runs the raw-transaction intake behind its JSON-RPC gateway.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Install the log subscriber
//! 3. Build accounts, ledger, metrics, event broadcaster and RPC registry
//! 4. Serve HTTP until shutdown is signalled
//!
//! ## Request Flow
//!
//! ```text
//! POST /api ──→ RpcDispatcher ──→ handler ──→ TransactionAssembler ──→ Ledger
//!                    │
//!                    └──→ MessageHandler ──→ metrics, log line, status_update
//!                                                               │
//!                                                    GET /ws ◄──┘
//! ```

pub mod container;

use anyhow::{Context, Result};
use std::future::Future;
use tracing::info;

pub use container::{ConfigError, NodeConfig, NodeContainer};

/// The node: its container plus the serve loop.
pub struct NodeRuntime {
    container: NodeContainer,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Result<Self> {
        let container = NodeContainer::new(config).context("failed to build node")?;
        Ok(Self { container })
    }

    pub fn container(&self) -> &NodeContainer {
        &self.container
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(
            addr = %self.container.gateway.config().http_addr(),
            "Starting intake node"
        );
        self.container
            .gateway
            .serve(shutdown)
            .await
            .context("RPC server failed")?;

        info!(
            accounts = self.container.accounts.len(),
            transactions = self.container.ledger.len(),
            "Intake node stopped"
        );
        Ok(())
    }
}
