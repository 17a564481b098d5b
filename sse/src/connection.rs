use crate::event::Event;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc::{error::SendError, UnboundedSender};
use uuid::Uuid;

/// Unique identifier for a connection (server-generated).
///
/// The format is `conn_<unix-millis>_<random-suffix>` for log readability;
/// uniqueness comes from the random suffix. Collisions among simultaneously
/// open connections are treated as negligible, not impossible: `register`
/// inserts unconditionally and a colliding id would overwrite (last writer
/// wins). A closed id is never handed out again for a different connection
/// within any realistic clock resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

/// Random hex characters appended after the millisecond timestamp.
const ID_SUFFIX_LEN: usize = 12;

impl ConnectionId {
    pub fn generate() -> Self {
        let suffix: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(ID_SUFFIX_LEN)
            .collect();
        Self(format!("conn_{}_{}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ConnectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One outbound byte-stream to a client.
///
/// The sending half of the connection's channel plus registration metadata.
/// The receiving half lives inside the web layer's response stream; when the
/// client's transport closes, the receiver is dropped and every subsequent
/// `write` fails. Writes through the channel are strictly ordered per
/// connection, and the response stream is the single consumer, so a broadcast
/// and a heartbeat for the same connection can never interleave their frames.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    sender: UnboundedSender<Event>,
    pub connected_at: DateTime<Utc>,
}

impl ConnectionHandle {
    pub fn new(sender: UnboundedSender<Event>) -> Self {
        Self {
            sender,
            connected_at: Utc::now(),
        }
    }

    /// Attempt a single non-blocking write. An error means the receiving
    /// stream is gone, i.e. the client's transport is closed.
    pub fn write(&self, event: Event) -> Result<(), SendError<Event>> {
        self.sender.send(event)
    }
}

/// Connection registry: the single source of truth for who is currently
/// connected.
///
/// An id present in the map denotes a connection whose handle is writable or
/// not yet proven dead; absence means the connection cannot be targeted. The
/// registry has no persistence - it starts empty on process start and every
/// connection is implicitly dropped on shutdown. Only the lifecycle
/// [`Manager`](crate::Manager) inserts and removes entries.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection - O(1). Inserts unconditionally; a colliding id
    /// overwrites the previous entry (see [`ConnectionId`]).
    pub fn register(&self, connection_id: ConnectionId, handle: ConnectionHandle) {
        self.connections.insert(connection_id, handle);
    }

    /// Remove a connection - O(1). Returns whether the id was present, so
    /// callers can make repeated teardown a no-op.
    pub fn unregister(&self, connection_id: &ConnectionId) -> bool {
        self.connections.remove(connection_id).is_some()
    }

    /// Look up a connection's handle - O(1). The handle is cloned out so no
    /// map guard is held across the caller's write.
    pub fn lookup(&self, connection_id: &ConnectionId) -> Option<ConnectionHandle> {
        self.connections
            .get(connection_id)
            .map(|entry| entry.value().clone())
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    /// Visit a point-in-time snapshot of every `(id, handle)` pair.
    ///
    /// The snapshot is materialized before the visitor runs, so no map locks
    /// are held during visits: the visitor may unregister entries (its own
    /// included) without deadlocking, and a removed entry is never
    /// resurrected.
    pub fn for_each(&self, mut visitor: impl FnMut(&ConnectionId, &ConnectionHandle)) {
        let entries: Vec<(ConnectionId, ConnectionHandle)> = self
            .connections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        for (connection_id, handle) in &entries {
            visitor(connection_id, handle);
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Currently registered ids. Order is not semantically significant.
    pub fn list_ids(&self) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Snapshot of ids and registration instants for the listing endpoint.
    pub fn snapshot(&self) -> Vec<(ConnectionId, DateTime<Utc>)> {
        self.connections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().connected_at))
            .collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tokio::sync::mpsc;

    fn handle() -> (ConnectionHandle, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionHandle::new(tx), rx)
    }

    #[test]
    fn test_register_then_lookup_returns_handle() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::generate();
        let (h, _rx) = handle();

        registry.register(id.clone(), h);

        assert!(registry.contains(&id));
        assert!(registry.lookup(&id).is_some(), "registered id should resolve");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_removes_and_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::generate();
        let (h, _rx) = handle();
        registry.register(id.clone(), h);

        assert!(registry.unregister(&id), "first unregister should report removal");
        assert!(!registry.unregister(&id), "repeat unregister should be a no-op");
        assert!(registry.lookup(&id).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_same_id_last_writer_wins() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::generate();
        let (first, mut first_rx) = handle();
        let (second, mut second_rx) = handle();

        registry.register(id.clone(), first);
        registry.register(id.clone(), second);

        assert_eq!(registry.len(), 1, "duplicate register should overwrite");
        registry
            .lookup(&id)
            .expect("id should still resolve")
            .write(Event::heartbeat())
            .expect("write to surviving handle should succeed");
        assert!(
            second_rx.try_recv().is_ok(),
            "the later registration should own the id"
        );
        assert!(first_rx.try_recv().is_err());
    }

    #[test]
    fn test_list_ids_matches_registered_connections() {
        let registry = ConnectionRegistry::new();
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();
        let (ha, _ra) = handle();
        let (hb, _rb) = handle();
        registry.register(a.clone(), ha);
        registry.register(b.clone(), hb);

        let ids: HashSet<ConnectionId> = registry.list_ids().into_iter().collect();
        assert_eq!(ids, HashSet::from([a, b]));
    }

    #[test]
    fn test_removal_during_iteration_does_not_resurrect() {
        let registry = ConnectionRegistry::new();
        let ids: Vec<ConnectionId> = (0..8).map(|_| ConnectionId::generate()).collect();
        for id in &ids {
            let (h, rx) = handle();
            drop(rx);
            registry.register(id.clone(), h);
        }

        // Remove entries from inside the visitor; the iteration must neither
        // crash nor bring a removed entry back.
        let mut visited = 0;
        registry.for_each(|id, _handle| {
            visited += 1;
            registry.unregister(id);
        });

        assert!(visited >= 1, "iteration should have visited live entries");
        assert_eq!(registry.len(), 0, "all visited entries should stay removed");
    }

    #[test]
    fn test_generated_ids_are_unique_and_readable() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let id = ConnectionId::generate();
            assert!(
                id.as_str().starts_with("conn_"),
                "id should carry the conn_ prefix for log readability"
            );
            assert!(seen.insert(id), "generated ids should not repeat");
        }
    }
}
