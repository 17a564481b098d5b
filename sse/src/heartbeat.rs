use crate::connection::{ConnectionId, ConnectionRegistry};
use crate::delivery::{DeliveryEngine, DeliveryError};
use crate::event::Event;
use dashmap::DashMap;
use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Per-connection periodic keep-alive driver.
///
/// Each started connection gets one spawned task ticking at the shared
/// interval. A tick sends a heartbeat through the delivery engine's unicast
/// path; if the connection has been unregistered the task cancels itself, so
/// timer lifetime never exceeds connection lifetime. Re-entrant or duplicate
/// [`stop`](HeartbeatScheduler::stop) calls are safe no-ops.
pub struct HeartbeatScheduler {
    tasks: Arc<DashMap<ConnectionId, JoinHandle<()>>>,
}

impl HeartbeatScheduler {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(DashMap::new()),
        }
    }

    /// Arm the periodic heartbeat for `connection_id`. The first heartbeat
    /// fires one full interval after the connection opens.
    ///
    /// On a tick: a missing registration cancels the timer; a write failure
    /// unregisters the connection and cancels the timer. Either way the task
    /// forgets itself, so a later `stop` finds nothing to do.
    pub fn start(
        &self,
        connection_id: ConnectionId,
        heartbeat_interval: Duration,
        engine: DeliveryEngine,
        registry: Arc<ConnectionRegistry>,
    ) {
        let tasks = Arc::clone(&self.tasks);
        let task_id = connection_id.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(heartbeat_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // An interval's first tick completes immediately; skip it so the
            // connection is not greeted with an instant heartbeat.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                match engine.send_to(&task_id, Event::heartbeat()) {
                    Ok(()) => {
                        debug!("Heartbeat sent to connection {task_id}");
                    }
                    Err(DeliveryError::NotFound) => {
                        debug!(
                            "Connection {task_id} no longer registered, cancelling heartbeat"
                        );
                        tasks.remove(&task_id);
                        break;
                    }
                    Err(DeliveryError::WriteFailed) => {
                        info!(
                            "Heartbeat write to connection {task_id} failed, tearing down"
                        );
                        registry.unregister(&task_id);
                        tasks.remove(&task_id);
                        break;
                    }
                }
            }
        });

        if let Some(previous) = self.tasks.insert(connection_id, handle) {
            // A colliding id overwrote its registry entry; its old timer goes too.
            previous.abort();
        }
    }

    /// Cancel the heartbeat for `connection_id`. No-op if it is not running.
    pub fn stop(&self, connection_id: &ConnectionId) {
        if let Some((_, task)) = self.tasks.remove(connection_id) {
            task.abort();
        }
    }

    /// Whether a heartbeat task is currently armed for `connection_id`.
    pub fn is_running(&self, connection_id: &ConnectionId) -> bool {
        self.tasks.contains_key(connection_id)
    }
}

impl Default for HeartbeatScheduler {
    fn default() -> Self {
        Self::new()
    }
}
