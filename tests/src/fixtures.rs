//! # Test Fixtures
//!
//! A full node built from the default configuration, driven through its
//! router, plus wallets that sign envelopes the way a client would.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use k256::ecdsa::SigningKey;
use node_runtime::{NodeConfig, NodeContainer};
use primitive_types::U256;
use serde_json::{json, Value};
use shared_types::Address;
use tower::ServiceExt;
use tx_verification::{
    address_from_pubkey, encode_call, encode_deployment, ContractCallPayload,
    ContractDeploymentPayload, UnsignedTransaction,
};

/// A node with in-memory collaborators, reachable through its router.
pub struct TestNode {
    pub container: NodeContainer,
}

impl TestNode {
    pub fn new() -> Self {
        Self::with_config(NodeConfig::default())
    }

    pub fn with_config(config: NodeConfig) -> Self {
        let container = NodeContainer::new(config).expect("default config is valid");
        Self { container }
    }

    /// POST one JSON-RPC request and return the parsed response body.
    pub async fn rpc(&self, method: &str, params: Value) -> Value {
        let body = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params});
        let (status, text) = self
            .request(
                Request::post("/api")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("valid request"),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "unexpected status for {method}: {text}");
        serde_json::from_str(&text).expect("JSON-RPC response")
    }

    /// GET `path` and return the status and body text.
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        self.request(Request::get(path).body(Body::empty()).expect("valid request"))
            .await
    }

    async fn request(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self
            .container
            .gateway
            .router()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Default for TestNode {
    fn default() -> Self {
        Self::new()
    }
}

/// A signing key and the address it owns.
pub struct Wallet {
    key: SigningKey,
    pub address: Address,
}

impl Wallet {
    pub fn random() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_pubkey(key.verifying_key());
        Self { key, address }
    }

    /// Hex envelope deploying `code`.
    pub fn deploy(&self, nonce: u64, code: &str, args: Vec<Value>) -> String {
        self.deploy_as(self.address, nonce, code, args)
    }

    /// Hex envelope deploying `code`, naming `from` as the sender.
    pub fn deploy_as(&self, from: Address, nonce: u64, code: &str, args: Vec<Value>) -> String {
        let payload = encode_deployment(&ContractDeploymentPayload {
            contract_code: code.to_string(),
            constructor_args: args,
        });
        self.sign(UnsignedTransaction {
            nonce,
            from_address: from,
            to_address: None,
            value: U256::zero(),
            payload,
        })
    }

    /// Hex envelope calling `function` on `to`.
    pub fn call(&self, nonce: u64, to: Address, function: &str, args: Vec<Value>) -> String {
        let payload = encode_call(&ContractCallPayload {
            function_name: function.to_string(),
            function_args: args,
        });
        self.sign(UnsignedTransaction {
            nonce,
            from_address: self.address,
            to_address: Some(to),
            value: U256::zero(),
            payload,
        })
    }

    pub fn sign(&self, tx: UnsignedTransaction) -> String {
        tx.sign(&self.key).expect("signing succeeds").to_hex()
    }
}
