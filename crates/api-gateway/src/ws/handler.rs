//! Per-connection loop that forwards broadcast call outcomes to one client.
//!
//! The channel is push-only: client text and binary frames are ignored, a
//! close frame or a failed send ends the connection.

use crate::domain::correlation::ConnectionId;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use rpc_telemetry::{EventBroadcaster, FormattedResponse, LiveEvent, RpcMetrics};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Serves one live-events subscriber.
pub struct LiveEventsHandler {
    events: EventBroadcaster,
    metrics: Arc<RpcMetrics>,
    connection_id: ConnectionId,
}

impl LiveEventsHandler {
    pub fn new(events: EventBroadcaster, metrics: Arc<RpcMetrics>) -> Self {
        Self {
            events,
            metrics,
            connection_id: ConnectionId::new(),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Run until the client leaves or the broadcaster shuts down.
    pub async fn handle(self, socket: WebSocket) {
        let mut updates = self.events.subscribe();
        self.refresh_gauge();
        info!(connection_id = %self.connection_id, "live events subscriber connected");

        let (mut sender, mut receiver) = socket.split();

        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Ok(response) => {
                        if let Err(e) = sender.send(encode_event(&response)).await {
                            debug!(connection_id = %self.connection_id, error = %e, "send failed");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            connection_id = %self.connection_id,
                            skipped,
                            "subscriber lagging, events dropped"
                        );
                    }
                    Err(RecvError::Closed) => break,
                },
                incoming = receiver.next() => match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(connection_id = %self.connection_id, error = %e, "receive failed");
                        break;
                    }
                },
            }
        }

        drop(updates);
        self.refresh_gauge();
        info!(connection_id = %self.connection_id, "live events subscriber disconnected");
    }

    fn refresh_gauge(&self) {
        self.metrics
            .set_active_connections(self.events.subscriber_count());
    }
}

/// `{"event":"status_update","data":{...}}` as a text frame.
pub fn encode_event(response: &FormattedResponse) -> Message {
    Message::Text(LiveEvent::status_update(response).to_json())
}
