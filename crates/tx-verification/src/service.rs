//! # Transaction Assembler
//!
//! Application service behind `send_raw_transaction`. Runs one envelope
//! through
//!
//! ```text
//! RECEIVED → DECODED → SENDER_VALIDATED → SIGNATURE_VERIFIED
//!          → CALL_PATH | DEPLOY_PATH → ASSEMBLED → INSERTED
//! ```
//!
//! Every step returns early on failure. Nothing touches the allocator or the
//! ledger until the envelope has been decoded, authenticated and classified,
//! so a rejected call leaves no trace.

use crate::domain::codec;
use crate::domain::entities::{DecodedTransaction, IntakeStage, SubmissionReceipt};
use crate::domain::errors::TransactionError;
use crate::domain::payload;
use crate::domain::signature::SignatureVerifier;
use crate::ports::inbound::TransactionIntakeApi;
use crate::ports::outbound::{AccountAllocator, AddressValidator, Ledger};
use shared_types::{Address, TransactionData, TransactionRecord, TransactionType};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Message for envelopes that do not decode.
pub const INVALID_TRANSACTION_DATA: &str = "invalid transaction data";

/// Message for envelopes whose signature does not match the sender.
pub const SIGNATURE_VERIFICATION_FAILED: &str = "signature verification failed";

/// Turns signed envelopes into ledger records.
pub struct TransactionAssembler {
    validator: Arc<dyn AddressValidator>,
    allocator: Arc<dyn AccountAllocator>,
    ledger: Arc<dyn Ledger>,
    verifier: SignatureVerifier,
}

impl TransactionAssembler {
    pub fn new(
        validator: Arc<dyn AddressValidator>,
        allocator: Arc<dyn AccountAllocator>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            validator,
            allocator,
            ledger,
            verifier: SignatureVerifier::new(),
        }
    }

    #[instrument(name = "assemble", skip_all, fields(size = signed_transaction.len()))]
    pub async fn assemble_and_insert(
        &self,
        signed_transaction: &str,
    ) -> Result<SubmissionReceipt, TransactionError> {
        let raw = codec::parse_hex(signed_transaction).map_err(|e| {
            debug!(reason = %e, "envelope hex rejected");
            rejected(IntakeStage::Received, TransactionError::invalid_transaction(INVALID_TRANSACTION_DATA))
        })?;
        let decoded = codec::decode(&raw).map_err(|e| {
            debug!(reason = %e, "envelope decode rejected");
            rejected(IntakeStage::Received, TransactionError::invalid_transaction(INVALID_TRANSACTION_DATA))
        })?;

        self.validate_address(&decoded.from_address, IntakeStage::Decoded)?;

        if !self.verifier.verify(&raw, &decoded) {
            return Err(rejected(
                IntakeStage::SenderValidated,
                TransactionError::invalid_transaction(SIGNATURE_VERIFICATION_FAILED),
            ));
        }

        let (record, contract_address) = match decoded.call_target() {
            Some(to) => (self.assemble_call(&decoded, to)?, None),
            None => {
                let (record, contract_address) = self.assemble_deployment(&decoded).await?;
                (record, Some(contract_address))
            }
        };
        let transaction_type = record.transaction_type;

        let transaction_id = self.ledger.insert(record).await.map_err(|e| {
            rejected(IntakeStage::Assembled, TransactionError::Ledger(e.to_string()))
        })?;

        info!(
            %transaction_id,
            from = %decoded.from_address,
            tx_type = ?transaction_type,
            stage = %IntakeStage::Inserted,
            "transaction recorded"
        );

        Ok(SubmissionReceipt {
            transaction_id,
            contract_address,
        })
    }

    fn validate_address(
        &self,
        address: &Address,
        stage: IntakeStage,
    ) -> Result<(), TransactionError> {
        let text = address.to_string();
        if self.validator.is_valid(&text) {
            Ok(())
        } else {
            Err(rejected(stage, TransactionError::invalid_address(text)))
        }
    }

    fn assemble_call(
        &self,
        decoded: &DecodedTransaction,
        to: Address,
    ) -> Result<TransactionRecord, TransactionError> {
        self.validate_address(&to, IntakeStage::CallPath)?;
        let call = payload::decode_call(&decoded.payload)
            .map_err(|e| rejected(IntakeStage::CallPath, e.into()))?;

        Ok(TransactionRecord {
            from_address: decoded.from_address,
            to_address: Some(to),
            transaction_data: Some(TransactionData::Call {
                function_name: call.function_name,
                function_args: call.function_args,
            }),
            value: decoded.value,
            transaction_type: TransactionType::Call,
        })
    }

    async fn assemble_deployment(
        &self,
        decoded: &DecodedTransaction,
    ) -> Result<(TransactionRecord, Address), TransactionError> {
        let deployment = payload::decode_deployment(&decoded.payload)
            .map_err(|e| rejected(IntakeStage::DeployPath, e.into()))?;

        let contract_address = self.allocator.allocate_new_account().await.map_err(|e| {
            rejected(IntakeStage::DeployPath, TransactionError::Allocation(e.to_string()))
        })?;

        let record = TransactionRecord {
            from_address: decoded.from_address,
            to_address: None,
            transaction_data: Some(TransactionData::Deployment {
                contract_address,
                contract_code: deployment.contract_code,
                constructor_args: deployment.constructor_args,
            }),
            value: decoded.value,
            transaction_type: TransactionType::Deployment,
        };
        Ok((record, contract_address))
    }
}

#[async_trait::async_trait]
impl TransactionIntakeApi for TransactionAssembler {
    async fn send_raw_transaction(
        &self,
        signed_transaction: &str,
    ) -> Result<SubmissionReceipt, TransactionError> {
        self.assemble_and_insert(signed_transaction).await
    }
}

fn rejected(stage: IntakeStage, err: TransactionError) -> TransactionError {
    warn!(%stage, error = %err, "transaction rejected");
    err
}
