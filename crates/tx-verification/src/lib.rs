//! # Transaction Intake
//!
//! Accepts signed raw transactions and turns them into ledger records.
//!
//! ## Architecture
//!
//! Hexagonal, like the rest of the workspace:
//! - **Domain Layer** (`domain/`): envelope codec, signature verifier and
//!   payload classifier. Pure, no I/O, safe to call concurrently.
//! - **Ports Layer** (`ports/`): the intake API and the collaborators it
//!   needs (address validator, account allocator, ledger)
//! - **Service Layer** (`service.rs`): [`TransactionAssembler`], which runs
//!   the decode → validate → verify → classify → insert sequence
//!
//! ## Security Notes
//!
//! - **Authorship**: the sender named in the envelope is only trusted after
//!   the recovered signer matches it
//! - **Malleability Prevention (EIP-2)**: high-S signatures are rejected
//! - **No partial writes**: allocation and insertion happen only after every
//!   check has passed

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::codec::{decode, encode_signed, encode_unsigned, parse_hex, MAX_ENVELOPE_SIZE};
pub use domain::entities::{
    ContractCallPayload, ContractDeploymentPayload, DecodedTransaction, EcdsaSignature,
    IntakeStage, SignedTransactionEnvelope, SubmissionReceipt, UnsignedTransaction,
};
pub use domain::errors::{CodecError, PayloadError, SignatureError, TransactionError};
pub use domain::payload::{decode_call, decode_deployment, encode_call, encode_deployment};
pub use domain::signature::{address_from_pubkey, keccak256, SignatureVerifier};
pub use ports::inbound::TransactionIntakeApi;
pub use ports::outbound::{AccountAllocator, AccountError, AddressValidator, Ledger, LedgerError};
pub use service::{TransactionAssembler, INVALID_TRANSACTION_DATA, SIGNATURE_VERIFICATION_FAILED};
