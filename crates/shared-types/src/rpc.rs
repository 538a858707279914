//! # Endpoint Results
//!
//! The value every RPC handler returns and the instrumentation pipeline
//! consumes.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Closed set of endpoint result statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    Debug,
    Info,
    Success,
    Error,
}

impl EndpointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one RPC handler invocation.
///
/// Serializes as `{"status":"error","message":…}` for errors and
/// `{"status":<status>,"data":…}` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResult {
    pub status: EndpointStatus,
    pub payload: serde_json::Value,
}

impl EndpointResult {
    pub fn new(status: EndpointStatus, payload: serde_json::Value) -> Self {
        Self { status, payload }
    }

    pub fn success(data: serde_json::Value) -> Self {
        Self::new(EndpointStatus::Success, data)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EndpointStatus::Error, serde_json::Value::String(message.into()))
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(EndpointStatus::Info, serde_json::Value::String(message.into()))
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(EndpointStatus::Debug, serde_json::Value::String(message.into()))
    }

    pub fn is_error(&self) -> bool {
        self.status == EndpointStatus::Error
    }
}

impl Serialize for EndpointResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EndpointResult", 2)?;
        state.serialize_field("status", &self.status)?;
        match self.status {
            EndpointStatus::Error => state.serialize_field("message", &self.payload)?,
            _ => state.serialize_field("data", &self.payload)?,
        }
        state.end()
    }
}

impl fmt::Display for EndpointResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{{\"status\":\"{}\"}}", self.status),
        }
    }
}
