//! Append-only in-memory transaction ledger.

use async_trait::async_trait;
use dashmap::DashMap;
use shared_types::{TransactionId, TransactionRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use tx_verification::{Ledger, LedgerError};

/// Records keyed by sequential ids starting at 1.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    next_id: AtomicU64,
    records: DashMap<TransactionId, TransactionRecord>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn insert(&self, record: TransactionRecord) -> Result<TransactionId, LedgerError> {
        let previous = self
            .next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map_err(|_| LedgerError::IdsExhausted)?;
        let id = TransactionId(previous + 1);
        self.records.insert(id, record);
        Ok(id)
    }

    async fn get(&self, id: TransactionId) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(self.records.get(&id).map(|record| record.clone()))
    }
}
