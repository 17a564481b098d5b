use crate::connection::{ConnectionId, ConnectionRegistry};
use crate::event::Event;
use log::*;
use std::sync::Arc;

/// Why a single delivery attempt did not reach its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The target id is not registered.
    NotFound,
    /// The handle write failed; the client's transport is gone. The caller
    /// is responsible for tearing the connection down - the engine itself
    /// never mutates the registry.
    WriteFailed,
}

/// Result of a broadcast. `sent + failed` equals the number of connections
/// visited; `failed_ids` lists the connections whose teardown the caller must
/// schedule.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub sent: usize,
    pub failed: usize,
    pub failed_ids: Vec<ConnectionId>,
}

/// Sends events to one connection (unicast) or all connections (broadcast).
///
/// Reads the registry, writes to handles, reports failures. Registry
/// mutation stays centralized in the lifecycle manager, which reacts to
/// [`DeliveryError::WriteFailed`] and [`BroadcastOutcome::failed_ids`].
#[derive(Clone)]
pub struct DeliveryEngine {
    registry: Arc<ConnectionRegistry>,
}

impl DeliveryEngine {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Attempt a single write of `event` to `connection_id`.
    pub fn send_to(&self, connection_id: &ConnectionId, event: Event) -> Result<(), DeliveryError> {
        let handle = self
            .registry
            .lookup(connection_id)
            .ok_or(DeliveryError::NotFound)?;

        handle.write(event).map_err(|_| {
            warn!("Failed to send event to connection {connection_id}. Connection will be cleaned up.");
            DeliveryError::WriteFailed
        })?;

        debug!("Event sent to connection {connection_id}");
        Ok(())
    }

    /// Write `event` to every registered connection independently.
    ///
    /// A failure on one connection increments `failed`, records the id for
    /// teardown, and iteration continues - one dead connection never blocks
    /// or aborts delivery to the others.
    pub fn broadcast(&self, event: Event) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();

        self.registry.for_each(|connection_id, handle| {
            match handle.write(event.clone()) {
                Ok(()) => outcome.sent += 1,
                Err(_) => {
                    warn!("Failed to send broadcast to connection {connection_id}");
                    outcome.failed += 1;
                    outcome.failed_ids.push(connection_id.clone());
                }
            }
        });

        info!(
            "Broadcast completed: sent={} failed={}",
            outcome.sent, outcome.failed
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionHandle;
    use crate::event::Event;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn engine_with_registry() -> (DeliveryEngine, Arc<ConnectionRegistry>) {
        let registry = Arc::new(ConnectionRegistry::new());
        (DeliveryEngine::new(Arc::clone(&registry)), registry)
    }

    fn open_connection(registry: &ConnectionRegistry) -> (ConnectionId, UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ConnectionId::generate();
        registry.register(id.clone(), ConnectionHandle::new(tx));
        (id, rx)
    }

    #[tokio::test]
    async fn test_send_to_unknown_id_reports_not_found_without_side_effects() {
        let (engine, registry) = engine_with_registry();
        let (live_id, mut rx) = open_connection(&registry);

        let result = engine.send_to(
            &ConnectionId::from("nonexistent".to_string()),
            Event::notification(None, "x"),
        );

        assert_eq!(result, Err(DeliveryError::NotFound));
        assert_eq!(registry.len(), 1, "registry must not be mutated");
        assert!(registry.contains(&live_id));
        assert!(
            rx.try_recv().is_err(),
            "other connections must be unaffected"
        );
    }

    #[tokio::test]
    async fn test_send_to_delivers_event_in_order() {
        let (engine, registry) = engine_with_registry();
        let (id, mut rx) = open_connection(&registry);

        engine
            .send_to(&id, Event::notification(Some("alert"), "first"))
            .expect("send should succeed");
        engine
            .send_to(&id, Event::heartbeat())
            .expect("send should succeed");

        match rx.recv().await.expect("first event should arrive") {
            Event::Notification(n) => {
                assert_eq!(n.event_type, "alert");
                assert_eq!(n.content, "first");
            }
            other => panic!("expected notification, got {other:?}"),
        }
        assert!(
            matches!(rx.recv().await, Some(Event::Heartbeat(_))),
            "per-connection writes must arrive in issue order"
        );
    }

    #[tokio::test]
    async fn test_send_to_closed_transport_reports_write_failed_without_unregistering() {
        let (engine, registry) = engine_with_registry();
        let (id, rx) = open_connection(&registry);
        drop(rx); // client transport closed out-of-band

        let result = engine.send_to(&id, Event::notification(None, "x"));

        assert_eq!(result, Err(DeliveryError::WriteFailed));
        assert!(
            registry.contains(&id),
            "the engine reports failures but never mutates the registry"
        );
    }

    #[tokio::test]
    async fn test_broadcast_counts_are_conserved() {
        let (engine, registry) = engine_with_registry();
        let receivers: Vec<_> = (0..5).map(|_| open_connection(&registry)).collect();
        let n = registry.len();

        let outcome = engine.broadcast(Event::notification(None, "hello"));

        assert_eq!(outcome.sent + outcome.failed, n);
        assert_eq!(outcome.sent, 5);
        assert!(outcome.failed_ids.is_empty());
        drop(receivers);
    }

    #[tokio::test]
    async fn test_broadcast_isolates_dead_connection() {
        let (engine, registry) = engine_with_registry();
        let (_a, mut rx_a) = open_connection(&registry);
        let (b, rx_b) = open_connection(&registry);
        let (_c, mut rx_c) = open_connection(&registry);
        drop(rx_b); // B's transport closed out-of-band

        let outcome = engine.broadcast(Event::notification(Some("notification"), "x"));

        assert_eq!(outcome.sent, 2, "A and C should still receive the event");
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.failed_ids, vec![b]);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_c.try_recv().is_ok());
    }
}
