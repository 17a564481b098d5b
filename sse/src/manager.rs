use crate::connection::{ConnectionHandle, ConnectionId, ConnectionRegistry};
use crate::delivery::{BroadcastOutcome, DeliveryEngine, DeliveryError};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::heartbeat::HeartbeatScheduler;
use chrono::{DateTime, Utc};
use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Connection lifecycle manager.
///
/// Mints identifiers, drives open/close transitions, and is the only
/// component that mutates the registry. Teardown is idempotent and funnels
/// every trigger - client disconnect, write failure, process shutdown -
/// through the same path: heartbeat cancelled, registry entry removed,
/// handle dropped.
pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    engine: DeliveryEngine,
    heartbeats: HeartbeatScheduler,
    heartbeat_interval: Duration,
}

impl Manager {
    pub fn new(heartbeat_interval: Duration) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let engine = DeliveryEngine::new(Arc::clone(&registry));

        Self {
            registry,
            engine,
            heartbeats: HeartbeatScheduler::new(),
            heartbeat_interval,
        }
    }

    /// Open a connection over the provided sender.
    ///
    /// Writes the `connected` event on the new handle before registering, so
    /// a transport that cannot enter streaming mode fails the connect attempt
    /// with [`Error::ConnectionSetup`] and leaves no orphan registry entry.
    /// On success the connection is registered and its heartbeat armed.
    pub fn connect(&self, sender: UnboundedSender<Event>) -> Result<ConnectionId> {
        let connection_id = ConnectionId::generate();
        let handle = ConnectionHandle::new(sender);

        handle
            .write(Event::connected(&connection_id))
            .map_err(|_| {
                error!("Failed to establish SSE connection: transport rejected initial write");
                Error::ConnectionSetup
            })?;

        self.registry.register(connection_id.clone(), handle);
        self.heartbeats.start(
            connection_id.clone(),
            self.heartbeat_interval,
            self.engine.clone(),
            Arc::clone(&self.registry),
        );

        info!("New SSE connection established: {connection_id}");
        Ok(connection_id)
    }

    /// Tear down `connection_id`: cancel its heartbeat, remove it from the
    /// registry, drop its handle. Idempotent - repeated calls are no-ops.
    pub fn teardown(&self, connection_id: &ConnectionId) {
        self.heartbeats.stop(connection_id);

        if self.registry.unregister(connection_id) {
            info!("Client disconnected: {connection_id}");
        }
    }

    /// Unicast `event` to `connection_id`. A write failure tears the
    /// connection down before the error is returned; an unknown id is
    /// reported as [`Error::ConnectionNotFound`] without side effects.
    pub fn send_to(&self, connection_id: &ConnectionId, event: Event) -> Result<()> {
        match self.engine.send_to(connection_id, event) {
            Ok(()) => Ok(()),
            Err(DeliveryError::NotFound) => Err(Error::ConnectionNotFound {
                connection_id: connection_id.clone(),
            }),
            Err(DeliveryError::WriteFailed) => {
                self.teardown(connection_id);
                Err(Error::WriteFailed {
                    connection_id: connection_id.clone(),
                })
            }
        }
    }

    /// Broadcast `event` to every connection and tear down the ones whose
    /// writes failed. Always succeeds; the outcome carries the counts.
    pub fn broadcast(&self, event: Event) -> BroadcastOutcome {
        let outcome = self.engine.broadcast(event);

        for connection_id in &outcome.failed_ids {
            self.teardown(connection_id);
        }

        outcome
    }

    /// Number of currently open connections.
    pub fn active_connections(&self) -> usize {
        self.registry.len()
    }

    /// Currently registered ids, in implementation-defined order.
    pub fn list_ids(&self) -> Vec<ConnectionId> {
        self.registry.list_ids()
    }

    /// Snapshot of ids and registration instants for the listing endpoint.
    pub fn connection_snapshot(&self) -> Vec<(ConnectionId, DateTime<Utc>)> {
        self.registry.snapshot()
    }

    /// Tear down every open connection. Called on process shutdown.
    pub fn shutdown(&self) {
        let ids = self.registry.list_ids();
        info!("Shutting down, closing {} connection(s)", ids.len());

        for connection_id in &ids {
            self.teardown(connection_id);
        }
    }
}
