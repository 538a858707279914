//! # Intake Node Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Node, wallet and JSON-RPC helpers
//! └── integration/      # Cross-crate flows through the HTTP router
//!     ├── intake_flows.rs
//!     └── instrumentation_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p rpc-tests
//!
//! # Benchmarks
//! cargo bench -p rpc-tests
//! ```

pub mod fixtures;
pub mod integration;
