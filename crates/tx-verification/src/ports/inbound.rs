//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::SubmissionReceipt;
use crate::domain::errors::TransactionError;

/// Accepts signed transactions from the RPC surface.
#[async_trait::async_trait]
pub trait TransactionIntakeApi: Send + Sync {
    /// Decode, authenticate, classify and record one signed transaction.
    ///
    /// # Arguments
    /// * `signed_transaction` - hex text of the signed envelope
    ///
    /// # Errors
    /// * `TransactionError::InvalidTransaction` - undecodable, unverifiable or
    ///   unclassifiable envelope
    /// * `TransactionError::InvalidAddress` - sender or destination rejected
    ///   by the address validator
    /// * `TransactionError::Allocation` / `TransactionError::Ledger` -
    ///   collaborator failure; nothing was inserted
    async fn send_raw_transaction(
        &self,
        signed_transaction: &str,
    ) -> Result<SubmissionReceipt, TransactionError>;
}
