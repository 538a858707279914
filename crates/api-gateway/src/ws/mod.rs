//! Live status events over WebSocket.

pub mod handler;

pub use handler::LiveEventsHandler;
