use crate::{AppState, Error};
use async_stream::stream;
use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event as WireEvent, Sse};
use axum::response::IntoResponse;
use log::*;
use sse::connection::ConnectionId;
use sse::Manager;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Tears the connection down when the response stream is dropped - whether
/// the channel drained after a server-side teardown or the client
/// disconnected mid-stream. Teardown is idempotent, so both paths firing is
/// harmless; the guard makes sure at least one of them does.
struct ConnectionGuard {
    manager: Arc<Manager>,
    connection_id: ConnectionId,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        debug!("SSE stream for {} dropped, cleaning up", self.connection_id);
        self.manager.teardown(&self.connection_id);
    }
}

/// SSE handler that establishes a long-lived connection for server pushes.
///
/// The first frame on the stream is the `connected` event carrying the new
/// connection id; heartbeats and notifications follow as they are issued.
/// The response stays open until the client disconnects or the server tears
/// the connection down.
pub(crate) async fn connect(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let connection_id = app_state.sse_manager.connect(tx)?;
    debug!("Establishing SSE connection {connection_id}");

    let guard = ConnectionGuard {
        manager: app_state.sse_manager.clone(),
        connection_id,
    };

    // Events arrive from the connection's channel; the axum Sse writer frames
    // each one as `data: <json>\n\n`.
    let stream = stream! {
        let _guard = guard;

        while let Some(event) = rx.recv().await {
            match WireEvent::default().json_data(&event) {
                Ok(frame) => yield Ok::<WireEvent, std::convert::Infallible>(frame),
                Err(e) => error!("Failed to serialize SSE event: {e}"),
            }
        }
    };

    Ok(([(header::CACHE_CONTROL, "no-cache")], Sse::new(stream)))
}
