//! # Error Types
//!
//! Errors raised while parsing shared entities.

use thiserror::Error;

/// Errors produced when parsing an [`crate::Address`] from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressParseError {
    /// Missing `0x` prefix.
    #[error("address must start with 0x")]
    MissingPrefix,

    /// Wrong number of hex digits after the prefix.
    #[error("address must have 40 hex digits, got {0}")]
    InvalidLength(usize),

    /// Non-hex character.
    #[error("address contains non-hex characters")]
    InvalidHex,

    /// Mixed-case address whose casing does not match its EIP-55 checksum.
    #[error("address checksum mismatch")]
    BadChecksum,
}

/// Error for an out-of-range [`crate::TransactionType`] discriminant.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("unknown transaction type: {0}")]
pub struct UnknownTransactionType(pub u8);
