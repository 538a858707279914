//! # Domain Layer
//!
//! Pure intake logic with no I/O dependencies: envelope codec, signature
//! verification and payload classification.

pub mod codec;
pub mod entities;
pub mod errors;
pub mod payload;
pub mod signature;
