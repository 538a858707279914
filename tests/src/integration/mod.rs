//! # Integration Flows
//!
//! Every test drives a full node through its HTTP router.

pub mod instrumentation_flows;
pub mod intake_flows;
