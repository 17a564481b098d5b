use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{Error, Result};
use sse::event::Event;

/// Request body for broadcast and send-to-connection notifications.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NotificationParams {
    /// The notification payload delivered to clients. Must not be empty.
    pub message: String,
    /// Event type stamped on the wire; defaults to "notification".
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
}

impl NotificationParams {
    pub fn validate(&self) -> Result<()> {
        if self.message.is_empty() {
            return Err(Error::Validation("Message must not be empty".to_string()));
        }
        Ok(())
    }

    /// Build the outbound event. The timestamp is fixed here, so every
    /// recipient of one broadcast sees the same instant.
    pub fn to_event(&self) -> Event {
        Event::notification(self.notification_type.as_deref(), &self.message)
    }
}
