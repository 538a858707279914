//! # Ports Layer
//!
//! - **Inbound (Driving)**: the intake API callers use
//! - **Outbound (Driven)**: address validation, account allocation and the
//!   ledger

pub mod inbound;
pub mod outbound;
