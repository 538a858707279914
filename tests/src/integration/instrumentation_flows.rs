//! # Instrumentation Flows
//!
//! Every RPC call is counted, timed and broadcast exactly once, whatever its
//! outcome.

#[cfg(test)]
mod tests {
    use crate::fixtures::{TestNode, Wallet};
    use axum::http::StatusCode;
    use rpc_telemetry::{LiveEvent, TRACE_ID_ALPHABET, TRACE_ID_LEN};
    use serde_json::json;
    use shared_types::{EndpointResult, EndpointStatus};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::broadcast::error::RecvError;
    use tokio::time::timeout;

    const REQUIRED_FAMILIES: [&str; 4] = [
        "rpc_server_request_count",
        "rpc_server_error_count",
        "rpc_server_duration",
        "rpc_server_active_connections",
    ];

    #[tokio::test]
    async fn test_request_and_error_counts() {
        const K: u64 = 7;
        const E: u64 = 3;
        let node = TestNode::new();
        let wallet = Wallet::random();

        for nonce in 0..(K - E) {
            let response = node
                .rpc("send_raw_transaction", json!([wallet.deploy(nonce, "C", vec![])]))
                .await;
            assert!(response.get("result").is_some());
        }
        for _ in 0..E {
            node.rpc("send_raw_transaction", json!(["0x00"])).await;
        }

        let metrics = &node.container.metrics;
        assert_eq!(metrics.request_count("send_raw_transaction"), K);
        assert_eq!(metrics.error_count("send_raw_transaction"), E);
        assert_eq!(metrics.duration_samples("send_raw_transaction"), K);
    }

    #[tokio::test]
    async fn test_subscriber_receives_status_update() {
        let node = TestNode::new();
        let mut updates = node.container.events.subscribe();

        node.rpc("ping", json!([])).await;

        let update = timeout(Duration::from_secs(1), updates.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(update.function_name, "ping");
        assert_eq!(update.result, EndpointResult::success(json!({"status": "OK"})));
        assert_eq!(update.trace_id.len(), TRACE_ID_LEN);
        assert!(update.trace_id.bytes().all(|b| TRACE_ID_ALPHABET.contains(&b)));

        let wire: serde_json::Value =
            serde_json::from_str(&LiveEvent::status_update(&update).to_json()).unwrap();
        assert_eq!(wire["event"], "status_update");
        assert_eq!(wire["data"]["result"]["data"]["status"], "OK");

        assert_eq!(node.container.metrics.active_connections(), 1);
    }

    #[tokio::test]
    async fn test_failed_call_broadcast_as_error() {
        let node = TestNode::new();
        let mut updates = node.container.events.subscribe();

        node.rpc("get_transaction_by_id", json!([99])).await;

        let update = updates.recv().await.unwrap();
        assert_eq!(update.function_name, "get_transaction_by_id");
        assert_eq!(update.result.status, EndpointStatus::Error);
    }

    #[tokio::test]
    async fn test_each_call_gets_fresh_trace_id() {
        let node = TestNode::new();
        let mut updates = node.container.events.subscribe();

        node.rpc("ping", json!([])).await;
        node.rpc("ping", json!([])).await;

        let first = updates.recv().await.unwrap();
        let second = updates.recv().await.unwrap();
        assert_ne!(first.trace_id, second.trace_id);
    }

    #[tokio::test]
    async fn test_metrics_exposition_after_calls() {
        let node = TestNode::new();
        node.rpc("ping", json!([])).await;
        node.rpc("ping", json!([])).await;
        node.rpc("no_such_method", json!([])).await;

        let (status, text) = node.get("/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.contains(r#"rpc_server_request_count{method="ping"} 2"#));
        assert!(text.contains(r#"rpc_server_error_count{method="no_such_method"} 1"#));
        assert!(text.contains(r#"rpc_server_duration_bucket{method="ping",le="10"}"#));
        assert!(text.contains("rpc_server_active_connections 0"));
    }

    #[tokio::test]
    async fn test_fresh_node_exposes_every_family() {
        let node = TestNode::new();

        let (status, text) = node.get("/metrics").await;
        assert_eq!(status, StatusCode::OK);
        for family in REQUIRED_FAMILIES {
            assert!(text.contains(family), "{family} missing from fresh /metrics");
        }
    }

    #[tokio::test]
    async fn test_reset_clears_series() {
        let node = TestNode::new();
        node.rpc("ping", json!([])).await;
        node.container.metrics.reset();

        let (_, text) = node.get("/metrics").await;
        assert!(!text.contains(r#"method="ping""#));
        for family in REQUIRED_FAMILIES {
            assert!(text.contains(family), "{family} missing after reset");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_lose_no_updates() {
        const CLIENTS: u64 = 8;
        const CALLS: u64 = 25;
        let node = Arc::new(TestNode::new());

        let tasks: Vec<_> = (0..CLIENTS)
            .map(|_| {
                let node = Arc::clone(&node);
                tokio::spawn(async move {
                    for _ in 0..CALLS {
                        node.rpc("ping", json!([])).await;
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let metrics = &node.container.metrics;
        assert_eq!(metrics.request_count("ping"), CLIENTS * CALLS);
        assert_eq!(metrics.duration_samples("ping"), CLIENTS * CALLS);
        assert_eq!(metrics.error_count("ping"), 0);
    }

    #[tokio::test]
    async fn test_stalled_subscriber_does_not_block_calls() {
        let node = TestNode::new();
        let capacity = node.container.events.capacity();
        let mut stalled = node.container.events.subscribe();

        let calls = capacity + 5;
        for _ in 0..calls {
            let response = timeout(Duration::from_secs(5), node.rpc("ping", json!([])))
                .await
                .expect("call completes while a subscriber is stalled");
            assert_eq!(response["result"]["data"]["status"], "OK");
        }

        assert_eq!(node.container.metrics.request_count("ping"), calls as u64);
        assert!(matches!(stalled.recv().await, Err(RecvError::Lagged(5))));
        assert!(stalled.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_progress_is_counted_but_not_timed() {
        let node = TestNode::new();
        let messages = node.container.gateway.dispatcher().messages();

        let ctx = messages.begin("deploy_contract");
        messages.send_progress(&ctx, &EndpointResult::info("Starting deployment"));
        messages.send_message(ctx, &EndpointResult::success(json!({"ok": true})));

        let metrics = &node.container.metrics;
        assert_eq!(metrics.request_count("deploy_contract"), 2);
        assert_eq!(metrics.duration_samples("deploy_contract"), 1);
    }
}
