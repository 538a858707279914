//! Handlers for every registered JSON-RPC method.

use super::{Params, RpcRegistry};
use crate::adapters::{AccountsManager, InMemoryLedger};
use crate::domain::error::{ApiError, ApiResult};
use primitive_types::U256;
use serde_json::{json, Value};
use shared_types::{Address, TransactionId, TransactionRecord, TransactionType};
use std::sync::Arc;
use tx_verification::{
    AddressValidator, Ledger, LedgerError, TransactionAssembler, TransactionError,
};

/// Collaborators captured by the handlers.
#[derive(Clone)]
pub struct EndpointDeps {
    pub assembler: Arc<TransactionAssembler>,
    pub accounts: Arc<AccountsManager>,
    pub ledger: Arc<dyn Ledger>,
    /// Longest hex string `send_raw_transaction` accepts.
    pub max_raw_transaction_size: usize,
}

impl EndpointDeps {
    /// Wire an assembler over the in-memory accounts and ledger. The accounts
    /// registry serves as both address validator and allocator.
    pub fn in_memory(
        accounts: Arc<AccountsManager>,
        ledger: Arc<InMemoryLedger>,
        max_raw_transaction_size: usize,
    ) -> Self {
        let assembler = Arc::new(TransactionAssembler::new(
            accounts.clone(),
            accounts.clone(),
            ledger.clone(),
        ));
        Self {
            assembler,
            accounts,
            ledger,
            max_raw_transaction_size,
        }
    }
}

/// Register the full method set.
pub fn register_endpoints(registry: &mut RpcRegistry, deps: EndpointDeps) {
    registry.register("ping", |_| async { Ok(json!({ "status": "OK" })) });

    let d = deps.clone();
    registry.register("create_account", move |_| {
        let d = d.clone();
        async move { create_account(&d) }
    });

    let d = deps.clone();
    registry.register("fund_account", move |params| {
        let d = d.clone();
        async move { fund_account(&d, params) }
    });

    let d = deps.clone();
    registry.register("send_transaction", move |params| {
        let d = d.clone();
        async move { send_transaction(&d, params).await }
    });

    let d = deps.clone();
    registry.register("get_transaction_by_id", move |params| {
        let d = d.clone();
        async move { get_transaction_by_id(&d, params).await }
    });

    let d = deps;
    registry.register("send_raw_transaction", move |params| {
        let d = d.clone();
        async move { send_raw_transaction(&d, params).await }
    });
}

fn create_account(deps: &EndpointDeps) -> ApiResult<Value> {
    let address = deps
        .accounts
        .create_account()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(json!({ "account_address": address }))
}

fn fund_account(deps: &EndpointDeps, params: Params) -> ApiResult<Value> {
    let address = valid_address(deps, &params.required::<String>(0, "account_address")?)?;
    let amount: u64 = params.required(1, "amount")?;

    deps.accounts.fund(address, U256::from(amount));
    Ok(json!({
        "account_address": address,
        "amount": amount,
    }))
}

async fn send_transaction(deps: &EndpointDeps, params: Params) -> ApiResult<Value> {
    let from = valid_address(deps, &params.required::<String>(0, "from_account")?)?;
    let to = valid_address(deps, &params.required::<String>(1, "to_account")?)?;
    let amount: u64 = params.required(2, "amount")?;

    let record = TransactionRecord {
        from_address: from,
        to_address: Some(to),
        transaction_data: None,
        value: U256::from(amount),
        transaction_type: TransactionType::Transfer,
    };
    let id = deps.ledger.insert(record).await.map_err(ledger_error)?;
    Ok(json!({ "transaction_id": id }))
}

async fn get_transaction_by_id(deps: &EndpointDeps, params: Params) -> ApiResult<Value> {
    let id = TransactionId(params.required(0, "transaction_id")?);
    let record = deps
        .ledger
        .get(id)
        .await
        .map_err(ledger_error)?
        .ok_or_else(|| ApiError::resource_not_found(format!("transaction {id}")))?;

    serde_json::to_value(record).map_err(|e| ApiError::internal(e.to_string()))
}

async fn send_raw_transaction(deps: &EndpointDeps, params: Params) -> ApiResult<Value> {
    let signed: String = params.required(0, "signed_transaction")?;
    if signed.len() > deps.max_raw_transaction_size {
        return Err(ApiError::limit_exceeded(format!(
            "raw transaction is {} characters, max {}",
            signed.len(),
            deps.max_raw_transaction_size
        )));
    }

    let receipt = deps.assembler.assemble_and_insert(&signed).await?;
    serde_json::to_value(receipt).map_err(|e| ApiError::internal(e.to_string()))
}

/// Gate `raw` through the accounts validator, the same check the intake
/// applies to envelope addresses.
fn valid_address(deps: &EndpointDeps, raw: &str) -> ApiResult<Address> {
    if !deps.accounts.is_valid(raw) {
        return Err(ApiError::from(TransactionError::invalid_address(raw)));
    }
    raw.parse::<Address>()
        .map_err(|_| ApiError::from(TransactionError::invalid_address(raw)))
}

fn ledger_error(err: LedgerError) -> ApiError {
    ApiError::internal(err.to_string())
}
