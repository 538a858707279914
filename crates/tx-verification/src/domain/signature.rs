//! # Signature Verification (secp256k1)
//!
//! Recovers the signer of an envelope and checks it against the sender the
//! envelope claims.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: S must be strictly below half the
//!   curve order
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Constant-Time Operations**: range checks use the `subtle` crate
//! - Every failure, including an unreadable envelope, is a verification
//!   failure and never a panic

use super::codec::{self, SIG_R, SIG_S, SIG_V};
use super::entities::{DecodedTransaction, EcdsaSignature, SignedTransactionEnvelope, UnsignedTransaction};
use super::errors::SignatureError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rlp::Rlp;
use sha3::{Digest, Keccak256};
use shared_types::Address;
use subtle::{Choice, ConstantTimeEq};
use tracing::debug;

/// secp256k1 curve order n
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// n/2, upper bound (exclusive) for S.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Checks that an envelope was signed by the sender it names.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    pub fn new() -> Self {
        Self
    }

    /// True when the signature in `raw` recovers to `decoded.from_address`.
    pub fn verify(&self, raw: &[u8], decoded: &DecodedTransaction) -> bool {
        match self.recover_signer(raw, decoded) {
            Ok(_) => true,
            Err(reason) => {
                debug!(%reason, from = %decoded.from_address, "signature rejected");
                false
            }
        }
    }

    /// Like [`Self::verify`] but says why a signature was rejected.
    pub fn recover_signer(
        &self,
        raw: &[u8],
        decoded: &DecodedTransaction,
    ) -> Result<Address, SignatureError> {
        let list = codec::open(raw)?;
        let message_hash = keccak256(&codec::signing_payload(&list)?);
        let signature = read_signature(&list)?;

        let recovered = verify_ecdsa(&message_hash, &signature)?;
        if recovered != decoded.from_address {
            return Err(SignatureError::SignerMismatch {
                expected: decoded.from_address,
                actual: recovered,
            });
        }
        Ok(recovered)
    }
}

impl UnsignedTransaction {
    /// Keccak-256 of the signing payload.
    pub fn signing_hash(&self) -> [u8; 32] {
        keccak256(&codec::encode_unsigned(self))
    }

    /// Sign with `key` and encode the envelope. The signature is low-S and
    /// `v` is 27 or 28.
    ///
    /// `from_address` is written as given, so signing with a key that does
    /// not own it produces an envelope that fails verification.
    pub fn sign(&self, key: &SigningKey) -> Result<SignedTransactionEnvelope, SignatureError> {
        let signature = sign_prehash(&self.signing_hash(), key)?;
        Ok(codec::encode_signed(self, &signature))
    }
}

/// Verify a signature over `message_hash` and recover the signer address.
///
/// Security validations performed:
/// 1. R is in valid range [1, n-1]
/// 2. S is in valid range [1, n-1]
/// 3. S is in lower half per EIP-2
/// 4. Recovery ID (v) is valid (0, 1, 27, or 28)
/// 5. Public key recovery succeeds
pub fn verify_ecdsa(
    message_hash: &[u8; 32],
    signature: &EcdsaSignature,
) -> Result<Address, SignatureError> {
    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }
    recover_address(message_hash, signature)
}

/// Recover the signer address from a signature over `message_hash`.
pub fn recover_address(
    message_hash: &[u8; 32],
    signature: &EcdsaSignature,
) -> Result<Address, SignatureError> {
    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&sig_bytes).map_err(|_| SignatureError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Sign a 32-byte digest, normalizing S to the lower half.
pub fn sign_prehash(
    message_hash: &[u8; 32],
    key: &SigningKey,
) -> Result<EcdsaSignature, SignatureError> {
    let (mut sig, mut recid) = key
        .sign_prehash_recoverable(message_hash)
        .map_err(|_| SignatureError::SigningFailed)?;

    // Flipping S to n - S flips the parity of the recovered point.
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recid = RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced());
    }

    let sig_bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig_bytes[..32]);
    s.copy_from_slice(&sig_bytes[32..]);

    Ok(EcdsaSignature {
        r,
        s,
        v: recid.to_byte() + 27,
    })
}

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Keccak256::digest(data));
    hash
}

/// Address owned by a public key: last 20 bytes of the Keccak-256 of the
/// uncompressed point without its 0x04 tag.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let point = public_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address(address)
}

/// Read `v`, `r` and `s` from an opened envelope.
fn read_signature(list: &Rlp<'_>) -> Result<EcdsaSignature, SignatureError> {
    let v_bytes = codec::decode_bytes(list, SIG_V, "v")?;
    let v = match v_bytes.as_slice() {
        [] => 0,
        [byte] => *byte,
        _ => return Err(SignatureError::InvalidFormat),
    };

    Ok(EcdsaSignature {
        r: read_scalar(list, SIG_R, "r")?,
        s: read_scalar(list, SIG_S, "s")?,
        v,
    })
}

fn read_scalar(
    list: &Rlp<'_>,
    index: usize,
    field: &'static str,
) -> Result<[u8; 32], SignatureError> {
    let bytes = codec::decode_bytes(list, index, field)?;
    if bytes.len() > 32 {
        return Err(SignatureError::InvalidFormat);
    }
    let mut scalar = [0u8; 32];
    scalar[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(scalar)
}

/// Accepts both raw (0/1) and Ethereum-offset (27/28) recovery IDs.
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let normalized = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };
    RecoveryId::from_byte(normalized).ok_or(SignatureError::InvalidRecoveryId(v))
}

/// s < n/2, in constant time.
fn is_low_s(s: &[u8; 32]) -> bool {
    ct_less_than(s, &SECP256K1_HALF_ORDER).into()
}

/// 0 < scalar < n, in constant time.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }
    (!is_zero & ct_less_than(scalar, &SECP256K1_ORDER)).into()
}

/// Big-endian `a < b` without early exit.
fn ct_less_than(a: &[u8; 32], b: &[u8; 32]) -> Choice {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for (a_byte, b_byte) in a.iter().zip(b.iter()) {
        let not_decided = !(less | greater);
        less |= not_decided & Choice::from((a_byte < b_byte) as u8);
        greater |= not_decided & Choice::from((a_byte > b_byte) as u8);
    }

    less
}


#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;
    use crate::domain::codec::{decode, encode_signed};

    fn signed_pair() -> (UnsignedTransaction, EcdsaSignature, Vec<u8>) {
        let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
        let from = address_from_pubkey(key.verifying_key());
        let tx = unsigned(from, Some(Address([0xBB; 20])), b"call".to_vec());
        let signature = sign_prehash(&tx.signing_hash(), &key).unwrap();
        let raw = encode_signed(&tx, &signature).as_bytes().to_vec();
        (tx, signature, raw)
    }

    #[test]
    fn test_valid_signature_verifies() {
        let (key, from) = generate_keypair();
        let envelope = unsigned(from, None, b"deploy".to_vec()).sign(&key).unwrap();
        let raw = envelope.as_bytes();

        let verifier = SignatureVerifier::new();
        assert!(verifier.verify(raw, &decode(raw).unwrap()));
    }

    #[test]
    fn test_verification_is_deterministic() {
        let (_, _, raw) = signed_pair();
        let decoded = decode(&raw).unwrap();
        let verifier = SignatureVerifier::new();
        assert_eq!(
            verifier.recover_signer(&raw, &decoded),
            verifier.recover_signer(&raw, &decoded)
        );
    }

    #[test]
    fn test_wrong_signer_rejected() {
        let (key, _) = generate_keypair();
        let claimed = Address([0xAA; 20]);
        let envelope = unsigned(claimed, None, vec![]).sign(&key).unwrap();
        let raw = envelope.as_bytes();
        let decoded = decode(raw).unwrap();

        let result = SignatureVerifier::new().recover_signer(raw, &decoded);
        assert!(matches!(result, Err(SignatureError::SignerMismatch { expected, .. }) if expected == claimed));
        assert!(!SignatureVerifier::new().verify(raw, &decoded));
    }

    #[test]
    fn test_any_signature_bit_flip_rejected() {
        let (tx, signature, raw) = signed_pair();
        let decoded = decode(&raw).unwrap();
        let verifier = SignatureVerifier::new();
        assert!(verifier.verify(&raw, &decoded));

        for bit in 0..(65 * 8) {
            let mut flipped = signature;
            let byte = bit / 8;
            let mask = 1u8 << (bit % 8);
            match byte {
                0..=31 => flipped.r[byte] ^= mask,
                32..=63 => flipped.s[byte - 32] ^= mask,
                _ => flipped.v ^= mask,
            }
            let tampered = encode_signed(&tx, &flipped);
            assert!(
                !verifier.verify(tampered.as_bytes(), &decoded),
                "bit {bit} flip still verified"
            );
        }
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let (mut tx, signature, raw) = signed_pair();
        let decoded = decode(&raw).unwrap();
        tx.payload = b"other".to_vec();
        let tampered = encode_signed(&tx, &signature);
        assert!(!SignatureVerifier::new().verify(tampered.as_bytes(), &decoded));
    }

    #[test]
    fn test_high_s_rejected() {
        let message_hash = keccak256(b"test message");
        let signature = EcdsaSignature {
            r: [0x12; 32],
            s: SECP256K1_HALF_ORDER,
            v: 27,
        };
        assert_eq!(
            verify_ecdsa(&message_hash, &signature),
            Err(SignatureError::MalleableSignature)
        );
    }

    #[test]
    fn test_out_of_range_scalars_rejected() {
        let message_hash = keccak256(b"test message");
        let zero_r = EcdsaSignature {
            r: [0u8; 32],
            s: [0x01; 32],
            v: 27,
        };
        let r_at_order = EcdsaSignature {
            r: SECP256K1_ORDER,
            s: [0x01; 32],
            v: 27,
        };
        assert_eq!(verify_ecdsa(&message_hash, &zero_r), Err(SignatureError::InvalidFormat));
        assert_eq!(verify_ecdsa(&message_hash, &r_at_order), Err(SignatureError::InvalidFormat));
    }

    #[test]
    fn test_recovery_id_parsing() {
        assert!(parse_recovery_id(0).is_ok());
        assert!(parse_recovery_id(1).is_ok());
        assert!(parse_recovery_id(27).is_ok());
        assert!(parse_recovery_id(28).is_ok());
        assert_eq!(parse_recovery_id(2), Err(SignatureError::InvalidRecoveryId(2)));
        assert_eq!(parse_recovery_id(29), Err(SignatureError::InvalidRecoveryId(29)));
    }

    #[test]
    fn test_oversized_scalar_is_verification_failure() {
        let (tx, _, raw) = signed_pair();
        let decoded = decode(&raw).unwrap();

        let mut stream = rlp::RlpStream::new_list(codec::ENVELOPE_FIELDS);
        stream.append(&tx.nonce);
        stream.append(&tx.from_address.as_bytes().to_vec());
        stream.append(&Address([0xBB; 20]).as_bytes().to_vec());
        stream.append(&tx.value);
        stream.append(&tx.payload);
        stream.append(&27u8);
        stream.append(&vec![0x01u8; 33]);
        stream.append(&vec![0x01u8; 32]);
        let raw = stream.out().to_vec();

        // Still decodes; the signature is just unusable.
        assert!(decode(&raw).is_ok());
        assert_eq!(
            SignatureVerifier::new().recover_signer(&raw, &decoded),
            Err(SignatureError::InvalidFormat)
        );
    }

    #[test]
    fn test_unreadable_envelope_is_verification_failure() {
        let (_, _, raw) = signed_pair();
        let decoded = decode(&raw).unwrap();
        assert!(!SignatureVerifier::new().verify(&raw[..10], &decoded));
    }
}
