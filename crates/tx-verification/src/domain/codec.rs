//! # Envelope Codec
//!
//! Wire form of a signed transaction: hex text (optional `0x`) of the RLP list
//!
//! ```text
//! [nonce, from, to, value, data, v, r, s]
//! ```
//!
//! - `from` is exactly 20 bytes; `to` is empty or 20 bytes.
//! - `nonce` and `value` are canonical RLP integers (no leading zeros).
//! - The signing payload is `rlp([nonce, from, to, value, data])`.
//!
//! Decoding checks the list shape but never reads `v`, `r` or `s`; those are
//! the verifier's business, so a broken signature is a verification failure
//! and not a decode error.

use super::entities::{DecodedTransaction, EcdsaSignature, SignedTransactionEnvelope, UnsignedTransaction};
use super::errors::CodecError;
use rlp::{DecoderError, Rlp, RlpStream};
use shared_types::{Address, U256};

/// Maximum envelope size in bytes (128 KiB).
pub const MAX_ENVELOPE_SIZE: usize = 128 * 1024;

/// Items in a signed envelope list.
pub const ENVELOPE_FIELDS: usize = 8;

/// Items covered by the signing payload.
pub const SIGNED_FIELDS: usize = 5;

const NONCE: usize = 0;
const FROM: usize = 1;
const TO: usize = 2;
const VALUE: usize = 3;
const DATA: usize = 4;
pub(crate) const SIG_V: usize = 5;
pub(crate) const SIG_R: usize = 6;
pub(crate) const SIG_S: usize = 7;

/// Decode the hex text form into raw envelope bytes.
pub fn parse_hex(raw: &str) -> Result<Vec<u8>, CodecError> {
    let digits = raw.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    if digits.is_empty() {
        return Err(CodecError::Empty);
    }
    if digits.len() / 2 > MAX_ENVELOPE_SIZE {
        return Err(CodecError::TooLarge {
            size: digits.len() / 2,
            max: MAX_ENVELOPE_SIZE,
        });
    }

    hex::decode(digits).map_err(|_| CodecError::InvalidHex)
}

/// Decode sender, destination, value and payload from raw envelope bytes.
///
/// Pure and deterministic.
pub fn decode(raw: &[u8]) -> Result<DecodedTransaction, CodecError> {
    let list = open(raw)?;

    let from_bytes = decode_bytes(&list, FROM, "from")?;
    let from_address = Address::from_slice(&from_bytes).ok_or(CodecError::FieldLength {
        field: "from",
        expected: "20",
        actual: from_bytes.len(),
    })?;

    Ok(DecodedTransaction {
        nonce: decode_u64(&list, NONCE, "nonce")?,
        from_address,
        to_address: decode_optional_address(&list, TO, "to")?,
        value: decode_u256(&list, VALUE, "value")?,
        payload: decode_bytes(&list, DATA, "data")?,
    })
}

/// Open the outer list and check its framing: a single list of exactly
/// [`ENVELOPE_FIELDS`] items with nothing after it.
pub(crate) fn open(raw: &[u8]) -> Result<Rlp<'_>, CodecError> {
    if raw.is_empty() {
        return Err(CodecError::Empty);
    }
    if raw.len() > MAX_ENVELOPE_SIZE {
        return Err(CodecError::TooLarge {
            size: raw.len(),
            max: MAX_ENVELOPE_SIZE,
        });
    }

    let list = Rlp::new(raw);
    if !list.is_list() {
        return Err(CodecError::NotAList);
    }

    let info = list.payload_info().map_err(|e| rlp_error("envelope", e))?;
    if info.total() < raw.len() {
        return Err(CodecError::TrailingBytes(raw.len() - info.total()));
    }
    if info.total() > raw.len() {
        return Err(rlp_error("envelope", DecoderError::RlpIsTooShort));
    }

    let count = list.item_count().map_err(|e| rlp_error("envelope", e))?;
    if count != ENVELOPE_FIELDS {
        return Err(CodecError::FieldCount(count));
    }

    Ok(list)
}

/// Bytes the signer committed to, rebuilt from the raw items of an opened
/// envelope.
pub(crate) fn signing_payload(list: &Rlp<'_>) -> Result<Vec<u8>, CodecError> {
    let mut stream = RlpStream::new_list(SIGNED_FIELDS);
    for index in 0..SIGNED_FIELDS {
        let item = list.at(index).map_err(|e| rlp_error("envelope", e))?;
        stream.append_raw(item.as_raw(), 1);
    }
    Ok(stream.out().to_vec())
}

/// Signing payload for a transaction that has not been signed yet.
pub fn encode_unsigned(tx: &UnsignedTransaction) -> Vec<u8> {
    let mut stream = RlpStream::new_list(SIGNED_FIELDS);
    append_unsigned(&mut stream, tx);
    stream.out().to_vec()
}

/// Full envelope for a transaction and its signature.
pub fn encode_signed(tx: &UnsignedTransaction, signature: &EcdsaSignature) -> SignedTransactionEnvelope {
    let mut stream = RlpStream::new_list(ENVELOPE_FIELDS);
    append_unsigned(&mut stream, tx);
    stream.append(&signature.v);
    stream.append(&signature.r.to_vec());
    stream.append(&signature.s.to_vec());
    SignedTransactionEnvelope::from_bytes(stream.out().to_vec())
}

fn append_unsigned(stream: &mut RlpStream, tx: &UnsignedTransaction) {
    stream.append(&tx.nonce);
    stream.append(&tx.from_address.as_bytes().to_vec());
    match tx.to_address {
        Some(to) => stream.append(&to.as_bytes().to_vec()),
        None => stream.append_empty_data(),
    };
    stream.append(&tx.value);
    stream.append(&tx.payload);
}

// Helper functions for RLP decoding

fn decode_u64(list: &Rlp<'_>, index: usize, field: &'static str) -> Result<u64, CodecError> {
    list.at(index)
        .and_then(|item| item.as_val())
        .map_err(|e| rlp_error(field, e))
}

fn decode_u256(list: &Rlp<'_>, index: usize, field: &'static str) -> Result<U256, CodecError> {
    list.at(index)
        .and_then(|item| item.as_val())
        .map_err(|e| rlp_error(field, e))
}

pub(crate) fn decode_bytes(
    list: &Rlp<'_>,
    index: usize,
    field: &'static str,
) -> Result<Vec<u8>, CodecError> {
    list.at(index)
        .and_then(|item| item.as_val::<Vec<u8>>())
        .map_err(|e| rlp_error(field, e))
}

fn decode_optional_address(
    list: &Rlp<'_>,
    index: usize,
    field: &'static str,
) -> Result<Option<Address>, CodecError> {
    let bytes = decode_bytes(list, index, field)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Address::from_slice(&bytes)
        .map(Some)
        .ok_or(CodecError::FieldLength {
            field,
            expected: "0 or 20",
            actual: bytes.len(),
        })
}

fn rlp_error(field: &'static str, e: DecoderError) -> CodecError {
    CodecError::Rlp {
        field,
        reason: format!("{e:?}"),
    }
}
