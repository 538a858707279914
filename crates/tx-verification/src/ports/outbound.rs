//! # Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the intake depends on. The in-memory implementations live in
//! the API gateway.

use shared_types::{Address, TransactionId, TransactionRecord};
use thiserror::Error;

/// Error from account allocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    /// Could not find an unused address.
    #[error("address space exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Error from ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger ran out of identifiers.
    #[error("transaction id space exhausted")]
    IdsExhausted,
}

/// Decides whether an address string is acceptable.
///
/// Checked before any side effect of the call it guards.
pub trait AddressValidator: Send + Sync {
    fn is_valid(&self, address: &str) -> bool;
}

/// Hands out addresses nobody owns yet.
#[async_trait::async_trait]
pub trait AccountAllocator: Send + Sync {
    /// Allocate and reserve a fresh address in one atomic step. Concurrent
    /// callers always receive distinct addresses.
    async fn allocate_new_account(&self) -> Result<Address, AccountError>;
}

/// Append-only store of transaction records.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    /// Store `record` under a new unique identifier. Ownership passes to the
    /// ledger.
    async fn insert(&self, record: TransactionRecord) -> Result<TransactionId, LedgerError>;

    async fn get(&self, id: TransactionId) -> Result<Option<TransactionRecord>, LedgerError>;
}
