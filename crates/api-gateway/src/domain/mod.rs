//! Domain types for the gateway: configuration, errors and connection ids.

pub mod config;
pub mod correlation;
pub mod error;
