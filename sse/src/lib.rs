//! Server-Sent Events (SSE) infrastructure for server-push notifications.
//!
//! This crate is the connection registry and broadcast/delivery engine that
//! backs the platform's push facility. Clients open long-lived streaming
//! connections and the server pushes asynchronous events to one, many, or all
//! of them.
//!
//! # Architecture
//!
//! - **Channel-backed handles**: Each connection owns one
//!   `tokio::sync::mpsc` unbounded channel. The web layer holds the receiving
//!   end inside the response stream; this crate writes to the sending end.
//!   A failed send means the client's transport is gone.
//! - **Single source of truth**: The [`connection::ConnectionRegistry`] owns
//!   the id-to-handle map. Only the lifecycle [`Manager`] mutates it.
//! - **Failure isolation**: [`delivery::DeliveryEngine::broadcast`] attempts
//!   every connection independently. One dead connection never blocks or
//!   aborts delivery to the others.
//! - **Self-terminating heartbeats**: Each connection gets a periodic
//!   heartbeat task that cancels itself once the connection is no longer
//!   registered, bounding timer lifetime to connection lifetime.
//! - **Ephemeral delivery**: Best effort only. There is no acknowledgement,
//!   retry, or replay; a client that is offline misses the event.
//!
//! # Lifecycle
//!
//! 1. The web layer creates a channel and calls [`Manager::connect`]
//! 2. The new handle receives a `connected` event carrying its id, then the
//!    connection is registered and its heartbeat starts
//! 3. Notifications arrive via [`Manager::send_to`] / [`Manager::broadcast`]
//! 4. Client disconnect, a failed write, or process shutdown funnel into
//!    [`Manager::teardown`], which is idempotent: the heartbeat is cancelled,
//!    the registry entry removed, and the handle dropped exactly once
//!
//! # Modules
//!
//! - `connection`: ConnectionId, ConnectionHandle and the ConnectionRegistry
//! - `delivery`: unicast/broadcast DeliveryEngine with failure isolation
//! - `event`: wire-level event types (connected, heartbeat, notification)
//! - `heartbeat`: per-connection periodic keep-alive scheduler
//! - `manager`: lifecycle manager tying the above together

pub mod connection;
pub mod delivery;
pub mod error;
pub mod event;
pub mod heartbeat;
pub mod manager;

pub use error::Error;
pub use manager::Manager;
