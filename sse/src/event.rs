//! Wire-level event types pushed to connected clients.
//!
//! Every event serializes to a flat JSON object discriminated by a `type`
//! string, matching what frontend EventSource consumers expect. The
//! `notification` variant's `type` is caller-supplied (defaulting to
//! `"notification"`), so the enum is untagged and each variant carries its
//! own discriminator field.

use crate::connection::ConnectionId;
use chrono::Utc;
use serde::Serialize;

/// Default `type` value for notifications when the caller does not supply one.
pub const DEFAULT_NOTIFICATION_TYPE: &str = "notification";

const CONNECTED_MESSAGE: &str = "SSE connection established";

/// An outbound event. Immutable once constructed; the timestamp is fixed at
/// construction time, not at write time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Event {
    Connected(ConnectedEvent),
    Heartbeat(HeartbeatEvent),
    Notification(NotificationEvent),
}

/// First event written on every new connection, carrying the id the client
/// should use to receive targeted messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub connection_id: ConnectionId,
    pub message: String,
    pub timestamp: String,
}

/// Periodic keep-alive event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartbeatEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: String,
}

/// Application payload delivered via unicast or broadcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub content: String,
    pub timestamp: String,
}

impl Event {
    pub fn connected(connection_id: &ConnectionId) -> Self {
        Event::Connected(ConnectedEvent {
            event_type: "connected".to_string(),
            connection_id: connection_id.clone(),
            message: CONNECTED_MESSAGE.to_string(),
            timestamp: now_rfc3339(),
        })
    }

    pub fn heartbeat() -> Self {
        Event::Heartbeat(HeartbeatEvent {
            event_type: "heartbeat".to_string(),
            timestamp: now_rfc3339(),
        })
    }

    /// A notification with a caller-supplied type. `None` falls back to
    /// [`DEFAULT_NOTIFICATION_TYPE`].
    pub fn notification(notification_type: Option<&str>, content: &str) -> Self {
        Event::Notification(NotificationEvent {
            event_type: notification_type
                .unwrap_or(DEFAULT_NOTIFICATION_TYPE)
                .to_string(),
            content: content.to_string(),
            timestamp: now_rfc3339(),
        })
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
