//! # Shared Types Crate
//!
//! This crate contains the domain entities that cross crate boundaries:
//!
//! - **Addresses**: [`Address`], a 20-byte account identifier rendered with
//!   an EIP-55 checksum.
//! - **Ledger records**: [`TransactionRecord`] and its closed
//!   [`TransactionType`] / [`TransactionData`] vocabulary.
//! - **Endpoint results**: [`EndpointResult`], the value every RPC handler
//!   produces and the instrumentation pipeline consumes.
//!
//! ## Design Principles
//!
//! - **Closed vocabularies**: transaction kinds and result statuses are enums,
//!   never strings.
//! - **Created once**: a `TransactionRecord` is built by the assembler and then
//!   handed to the ledger; nothing here mutates it afterwards.

pub mod entities;
pub mod errors;
pub mod rpc;

pub use entities::*;
pub use errors::*;
pub use rpc::{EndpointResult, EndpointStatus};
