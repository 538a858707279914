//! # Intake Errors
//!
//! `TransactionError` is what callers of the intake see. The other enums are
//! internal reasons, logged at the failure point and folded into a
//! `TransactionError` by the assembler.

use shared_types::Address;
use thiserror::Error;

/// Errors surfaced by the transaction intake.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// Malformed or disallowed address at any validation point.
    #[error("{}", invalid_address_message(.address, .message))]
    InvalidAddress {
        address: String,
        message: Option<String>,
    },

    /// Envelope failed to decode, classify or verify.
    #[error("{0}")]
    InvalidTransaction(String),

    /// The account allocator could not produce a fresh address.
    #[error("account allocation failed: {0}")]
    Allocation(String),

    /// The ledger rejected the insert.
    #[error("ledger insert failed: {0}")]
    Ledger(String),
}

fn invalid_address_message(address: &str, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("invalid address {address}"),
    }
}

impl TransactionError {
    pub fn invalid_address(address: impl ToString) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
            message: None,
        }
    }

    pub fn invalid_address_with(address: impl ToString, message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
            message: Some(message.into()),
        }
    }

    pub fn invalid_transaction(message: impl Into<String>) -> Self {
        Self::InvalidTransaction(message.into())
    }
}

/// Why an envelope failed to decode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("envelope is empty")]
    Empty,

    #[error("envelope is not valid hex")]
    InvalidHex,

    #[error("envelope too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("envelope is not an RLP list")]
    NotAList,

    #[error("envelope has {0} fields, expected 8")]
    FieldCount(usize),

    #[error("{field} must be {expected} bytes, got {actual}")]
    FieldLength {
        field: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("{0} trailing bytes after envelope")]
    TrailingBytes(usize),

    #[error("malformed {field}: {reason}")]
    Rlp { field: &'static str, reason: String },
}

/// Why a payload failed to classify.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("{kind} payload is not an RLP list of 2 items")]
    Shape { kind: &'static str },

    #[error("{field} is not valid UTF-8")]
    Utf8 { field: &'static str },

    #[error("{field} is not a JSON array: {reason}")]
    Arguments { field: &'static str, reason: String },

    #[error("function name is empty")]
    EmptyFunctionName,
}

impl From<PayloadError> for TransactionError {
    fn from(err: PayloadError) -> Self {
        TransactionError::InvalidTransaction(err.to_string())
    }
}

/// Why a signature did not authenticate its envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// r or s missing, too long, zero or not below the curve order.
    #[error("invalid signature format")]
    InvalidFormat,

    /// s in the upper half of the curve order (EIP-2).
    #[error("malleable signature (high S value)")]
    MalleableSignature,

    #[error("invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    #[error("failed to recover public key")]
    RecoveryFailed,

    #[error("signer mismatch: expected {expected}, got {actual}")]
    SignerMismatch { expected: Address, actual: Address },

    /// The raw envelope could not be re-read for verification.
    #[error("envelope unreadable: {0}")]
    Envelope(#[from] CodecError),

    /// Signing key rejected the digest.
    #[error("signing failed")]
    SigningFailed,
}
