//! # Intake Entities
//!
//! Values that flow through one `send_raw_transaction` call. All of them are
//! built once and never mutated.

use serde::Serialize;
use shared_types::{Address, TransactionId, U256};
use std::fmt;

/// Raw signed transaction bytes, as received.
///
/// Opaque until decoded. Cloning is cheap enough for the sizes the codec
/// accepts, and nothing hands out a mutable view.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedTransactionEnvelope(Vec<u8>);

impl SignedTransactionEnvelope {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex, the form `send_raw_transaction` takes.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for SignedTransactionEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignedTransactionEnvelope({} bytes)", self.0.len())
    }
}

/// Transaction fields read from an envelope. The signature is not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub nonce: u64,
    /// Claimed sender; only trusted after the verifier agrees.
    pub from_address: Address,
    /// `None` when the envelope carried an empty destination.
    pub to_address: Option<Address>,
    pub value: U256,
    /// Call or deployment blob, classified later.
    pub payload: Vec<u8>,
}

impl DecodedTransaction {
    /// Destination of a contract call, or `None` when the envelope is a
    /// deployment. Empty and all-zero destinations are both placeholders.
    pub fn call_target(&self) -> Option<Address> {
        self.to_address.filter(|to| !to.is_zero())
    }

    pub fn is_deployment(&self) -> bool {
        self.call_target().is_none()
    }
}

/// Method invocation carried by a call transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCallPayload {
    pub function_name: String,
    pub function_args: Vec<serde_json::Value>,
}

/// Contract source and constructor arguments carried by a deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractDeploymentPayload {
    pub contract_code: String,
    pub constructor_args: Vec<serde_json::Value>,
}

/// Recoverable secp256k1 signature as carried in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdsaSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// 0, 1, 27 or 28.
    pub v: u8,
}

/// Fields a client signs. `sign` turns it into an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    pub from_address: Address,
    pub to_address: Option<Address>,
    pub value: U256,
    pub payload: Vec<u8>,
}

/// What a successful intake returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub transaction_id: TransactionId,
    /// Only set for deployments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
}

/// Stages of one intake, in order. Any stage can end in a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStage {
    Received,
    Decoded,
    SenderValidated,
    SignatureVerified,
    CallPath,
    DeployPath,
    Assembled,
    Inserted,
}

impl IntakeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Decoded => "decoded",
            Self::SenderValidated => "sender_validated",
            Self::SignatureVerified => "signature_verified",
            Self::CallPath => "call_path",
            Self::DeployPath => "deploy_path",
            Self::Assembled => "assembled",
            Self::Inserted => "inserted",
        }
    }
}

impl fmt::Display for IntakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
