//! In-memory implementations of the intake's outbound ports.

pub mod accounts;
pub mod ledger;

pub use accounts::AccountsManager;
pub use ledger::InMemoryLedger;
