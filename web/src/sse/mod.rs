//! SSE HTTP handler for the web layer.
//!
//! This module contains only the axum handler for the streaming connect
//! endpoint. The core SSE infrastructure (Manager, ConnectionRegistry,
//! DeliveryEngine) lives in the `sse` crate.

pub mod handler;
