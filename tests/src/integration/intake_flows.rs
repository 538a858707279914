//! # Intake Flows
//!
//! Signed envelopes submitted through `send_raw_transaction` end up as ledger
//! records, or are rejected with nothing written.

#[cfg(test)]
mod tests {
    use crate::fixtures::{TestNode, Wallet};
    use serde_json::{json, Value};
    use shared_types::{Address, TransactionData, TransactionRecord, TransactionType, U256};
    use std::collections::HashSet;
    use std::sync::Arc;
    use tx_verification::{TransactionIntakeApi, UnsignedTransaction};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    async fn submit(node: &TestNode, envelope: &str) -> Value {
        node.rpc("send_raw_transaction", json!([envelope])).await
    }

    async fn record(node: &TestNode, id: &Value) -> TransactionRecord {
        let response = node.rpc("get_transaction_by_id", json!([id])).await;
        serde_json::from_value(response["result"]["data"].clone()).unwrap()
    }

    // =============================================================================
    // ACCEPTED ENVELOPES
    // =============================================================================

    #[tokio::test]
    async fn test_deployment_creates_contract_account() {
        let node = TestNode::new();
        let wallet = Wallet::random();

        let response = submit(&node, &wallet.deploy(0, "C", vec![])).await;
        let data = &response["result"]["data"];
        assert_eq!(response["result"]["status"], "success");

        let contract: Address = data["contract_address"].as_str().unwrap().parse().unwrap();
        let stored = record(&node, &data["transaction_id"]).await;

        assert_eq!(stored.transaction_type, TransactionType::Deployment);
        assert_eq!(stored.from_address, wallet.address);
        assert_eq!(stored.to_address, None);
        assert_eq!(
            stored.transaction_data,
            Some(TransactionData::Deployment {
                contract_address: contract,
                contract_code: "C".into(),
                constructor_args: vec![],
            })
        );
        assert!(node.container.accounts.balance(&contract).is_some());
    }

    #[tokio::test]
    async fn test_call_records_function_and_args() {
        let node = TestNode::new();
        let wallet = Wallet::random();
        let target = Address([0xBB; 20]);

        let response = submit(&node, &wallet.call(0, target, "resolve", vec![])).await;
        let data = &response["result"]["data"];
        assert!(data.get("contract_address").is_none());

        let stored = record(&node, &data["transaction_id"]).await;
        assert_eq!(stored.transaction_type, TransactionType::Call);
        assert_eq!(stored.to_address, Some(target));
        assert_eq!(
            stored.transaction_data,
            Some(TransactionData::Call {
                function_name: "resolve".into(),
                function_args: vec![],
            })
        );
    }

    #[tokio::test]
    async fn test_zero_destination_is_a_deployment() {
        let node = TestNode::new();
        let wallet = Wallet::random();
        let envelope = wallet.sign(UnsignedTransaction {
            nonce: 0,
            from_address: wallet.address,
            to_address: Some(Address::ZERO),
            value: Default::default(),
            payload: tx_verification::encode_deployment(&tx_verification::ContractDeploymentPayload {
                contract_code: "C".into(),
                constructor_args: vec![json!(1)],
            }),
        });

        let response = submit(&node, &envelope).await;
        assert!(response["result"]["data"]["contract_address"].is_string());
    }

    #[tokio::test]
    async fn test_transaction_ids_increase() {
        let node = TestNode::new();
        let wallet = Wallet::random();
        let target = Address([0xBB; 20]);

        let mut ids = Vec::new();
        for nonce in 0..3 {
            let response = submit(&node, &wallet.call(nonce, target, "tick", vec![])).await;
            ids.push(response["result"]["data"]["transaction_id"].as_u64().unwrap());
        }
        assert_eq!(ids, vec![1, 2, 3]);
    }

    // =============================================================================
    // REJECTED ENVELOPES
    // =============================================================================

    #[tokio::test]
    async fn test_signature_mismatch_rejected_and_counted() {
        let node = TestNode::new();
        let signer = Wallet::random();
        let victim = Wallet::random();

        let response = submit(&node, &signer.deploy_as(victim.address, 0, "C", vec![])).await;

        assert_eq!(
            response["error"]["data"],
            json!({"status": "error", "message": "signature verification failed"})
        );
        assert!(node.container.ledger.is_empty());
        assert!(node.container.accounts.is_empty());
        assert_eq!(node.container.metrics.error_count("send_raw_transaction"), 1);
    }

    #[tokio::test]
    async fn test_tampered_envelope_rejected() {
        let node = TestNode::new();
        let wallet = Wallet::random();
        let envelope = wallet.call(0, Address([0xBB; 20]), "resolve", vec![]);

        // Last hex digit belongs to `s`.
        let mut tampered = envelope.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });

        let response = submit(&node, &tampered).await;
        assert_eq!(response["error"]["message"], "signature verification failed");
        assert!(node.container.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_garbage_rejected_as_invalid_data() {
        let node = TestNode::new();
        for garbage in ["", "0x", "0xzz", "0xc0", "deadbeef"] {
            let response = submit(&node, garbage).await;
            assert_eq!(response["error"]["message"], "invalid transaction data", "{garbage}");
        }
        assert!(node.container.ledger.is_empty());
        assert_eq!(node.container.metrics.error_count("send_raw_transaction"), 5);
    }

    #[tokio::test]
    async fn test_call_with_empty_function_name_rejected() {
        let node = TestNode::new();
        let wallet = Wallet::random();

        let response = submit(&node, &wallet.call(0, Address([0xBB; 20]), "", vec![])).await;
        assert!(response.get("error").is_some());
        assert!(node.container.ledger.is_empty());
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deployments_get_distinct_addresses() {
        const N: usize = 32;
        let node = TestNode::new();
        let deps = api_gateway::EndpointDeps::in_memory(
            Arc::clone(&node.container.accounts),
            Arc::clone(&node.container.ledger),
            usize::MAX,
        );

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let assembler = Arc::clone(&deps.assembler);
                let envelope = Wallet::random().deploy(i as u64, "C", vec![]);
                tokio::spawn(async move { assembler.send_raw_transaction(&envelope).await })
            })
            .collect();

        let mut addresses = HashSet::new();
        let mut ids = HashSet::new();
        for handle in handles {
            let receipt = handle.await.unwrap().unwrap();
            ids.insert(receipt.transaction_id);
            addresses.insert(receipt.contract_address.unwrap());
        }

        assert_eq!(addresses.len(), N);
        assert_eq!(ids.len(), N);
        assert_eq!(node.container.ledger.len(), N);
    }

    // =============================================================================
    // ACCOUNT AND TRANSFER OPERATIONS
    // =============================================================================

    #[tokio::test]
    async fn test_transfer_between_created_accounts() {
        let node = TestNode::new();

        let from = node.rpc("create_account", json!([])).await["result"]["data"]["account_address"].clone();
        let to = node.rpc("create_account", json!([])).await["result"]["data"]["account_address"].clone();
        let funded = node.rpc("fund_account", json!([from, 100])).await;
        assert_eq!(funded["result"]["data"], json!({"account_address": from.clone(), "amount": 100}));

        let sent = node.rpc("send_transaction", json!([from, to, 40])).await;
        let stored = record(&node, &sent["result"]["data"]["transaction_id"]).await;

        assert_eq!(stored.transaction_type, TransactionType::Transfer);
        assert_eq!(stored.transaction_data, None);
        assert_eq!(stored.value, U256::from(40u64));
    }
}
