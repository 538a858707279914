//! Live status events.
//!
//! Every instrumented call produces one [`FormattedResponse`], which is fanned
//! out to subscribers over a tokio broadcast channel. Publishing never waits:
//! a subscriber that falls more than the channel capacity behind loses the
//! oldest events.

use serde::Serialize;
use shared_types::EndpointResult;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event name carried on the wire.
pub const STATUS_UPDATE_EVENT: &str = "status_update";

/// What subscribers learn about one finished call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedResponse {
    pub function_name: String,
    pub trace_id: String,
    pub result: EndpointResult,
}

/// Wire envelope: `{"event":"status_update","data":{...}}`.
#[derive(Debug, Serialize)]
pub struct LiveEvent<'a> {
    pub event: &'static str,
    pub data: &'a FormattedResponse,
}

impl<'a> LiveEvent<'a> {
    pub fn status_update(data: &'a FormattedResponse) -> Self {
        Self {
            event: STATUS_UPDATE_EVENT,
            data,
        }
    }

    pub fn to_json(&self) -> String {
        // Only strings and JSON values inside; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Fan-out of [`FormattedResponse`]s to every current subscriber.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<Arc<FormattedResponse>>,
    capacity: usize,
}

impl EventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        // tokio sizes the ring buffer to the next power of two.
        let capacity = capacity.max(1).next_power_of_two();
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Events a subscriber may fall behind before it starts losing them.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<FormattedResponse>> {
        self.sender.subscribe()
    }

    /// Send to whoever is listening. Having no subscribers is not an error.
    pub fn publish(&self, response: FormattedResponse) {
        let _ = self.sender.send(Arc::new(response));
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
