use anyhow::Result;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// One decoded SSE frame. The server does not use named SSE events, so the
/// discriminator lives inside the JSON payload's `type` field.
#[derive(Debug, Clone)]
pub struct Event {
    pub data: Value,
    pub timestamp: Instant,
}

impl Event {
    pub fn event_type(&self) -> &str {
        self.data["type"].as_str().unwrap_or("")
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.data["connectionId"].as_str()
    }
}

/// A live `/sse/connect` stream, decoded on a background task.
pub struct Connection {
    pub label: String,
    event_rx: mpsc::UnboundedReceiver<Event>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    pub async fn establish(base_url: &str, label: String) -> Result<Self> {
        let url = format!("{}/sse/connect", base_url);
        let (tx, rx) = mpsc::unbounded_channel();

        let client = es::ClientBuilder::for_url(&url)?.build();

        let task_label = label.clone();
        let handle = tokio::spawn(async move {
            let mut stream = client.stream();

            loop {
                match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => {
                        if let Ok(data) = serde_json::from_str(&event.data) {
                            let sse_event = Event {
                                data,
                                timestamp: Instant::now(),
                            };

                            if tx.send(sse_event).is_err() {
                                debug!("SSE receiver dropped for {}", task_label);
                                break;
                            }
                        }
                    }
                    Some(Ok(es::SSE::Comment(_))) => {
                        // Ignore comments
                    }
                    Some(Err(e)) => {
                        warn!("SSE error for {}: {}", task_label, e);
                    }
                    None => {
                        debug!("SSE stream ended for {}", task_label);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            label,
            event_rx: rx,
            _handle: handle,
        })
    }

    /// Wait for the connected handshake and return the connection id.
    pub async fn wait_for_connection_id(&mut self, timeout: Duration) -> Result<String> {
        let event = self.wait_for_event("connected", timeout).await?;
        event
            .connection_id()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("connected event without connectionId"))
    }

    pub async fn wait_for_event(&mut self, event_type: &str, timeout: Duration) -> Result<Event> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                anyhow::bail!("Timeout waiting for event: {}", event_type);
            }

            match tokio::time::timeout(remaining, self.event_rx.recv()).await {
                Ok(Some(event)) if event.event_type() == event_type => {
                    return Ok(event);
                }
                Ok(Some(_)) => {
                    // Wrong event type, keep waiting
                    continue;
                }
                Ok(None) => {
                    anyhow::bail!("SSE connection closed");
                }
                Err(_) => {
                    anyhow::bail!("Timeout waiting for event: {}", event_type);
                }
            }
        }
    }

    /// Drop the stream task, closing our side of the transport without
    /// telling the server. The next server write to this connection fails.
    pub fn sever(self) {
        debug!("Severing SSE transport for {}", self.label);
        self._handle.abort();
    }
}
