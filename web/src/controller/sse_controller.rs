use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use log::*;

use crate::params::sse::NotificationParams;
use crate::response::sse::{
    BroadcastResponse, ConnectionSummary, ConnectionsResponse, SendResponse,
};
use crate::{AppState, Error};
use sse::connection::ConnectionId;

/// POST broadcast a notification to every connected client
///
/// Always answers 200 with delivery counts, even if every write failed:
/// per-connection failures are isolated and reported, never escalated to a
/// failure of the broadcast request itself.
#[utoipa::path(
    post,
    path = "/sse/broadcast",
    request_body = NotificationParams,
    responses(
        (status = 200, description = "Broadcast attempted on every connection", body = BroadcastResponse),
        (status = 422, description = "Unprocessable Entity")
    )
)]
pub async fn broadcast(
    State(app_state): State<AppState>,
    Json(params): Json<NotificationParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST broadcast notification: {params:?}");
    params.validate()?;

    let outcome = app_state.sse_manager.broadcast(params.to_event());

    Ok(Json(BroadcastResponse {
        success: true,
        message: "Broadcast sent".to_string(),
        active_connections: app_state.sse_manager.active_connections(),
        sent_to: outcome.sent,
        failed_connections: outcome.failed,
    }))
}

/// POST send a notification to one connection by id
#[utoipa::path(
    post,
    path = "/sse/send/{connection_id}",
    params(
        ("connection_id" = String, Path, description = "Target connection id")
    ),
    request_body = NotificationParams,
    responses(
        (status = 200, description = "Notification written to the connection", body = SendResponse),
        (status = 422, description = "Unknown connection id or invalid body"),
        (status = 500, description = "Write to the connection failed; it has been torn down")
    )
)]
pub async fn send_to_connection(
    State(app_state): State<AppState>,
    Path(connection_id): Path<String>,
    Json(params): Json<NotificationParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST send notification to {connection_id}: {params:?}");
    params.validate()?;

    let connection_id = ConnectionId::from(connection_id);
    app_state
        .sse_manager
        .send_to(&connection_id, params.to_event())?;

    Ok(Json(SendResponse {
        success: true,
        message: "Message sent".to_string(),
        connection_id: connection_id.to_string(),
    }))
}

/// GET a snapshot of the currently open connections
#[utoipa::path(
    get,
    path = "/sse/connections",
    responses(
        (status = 200, description = "Snapshot of currently open connections", body = ConnectionsResponse)
    )
)]
pub async fn index(State(app_state): State<AppState>) -> impl IntoResponse {
    let connections: Vec<ConnectionSummary> = app_state
        .sse_manager
        .connection_snapshot()
        .into_iter()
        .map(|(connection_id, connected_at)| ConnectionSummary {
            connection_id: connection_id.to_string(),
            connected_at: connected_at.to_rfc3339(),
        })
        .collect();

    Json(ConnectionsResponse {
        active_connections: connections.len(),
        connections,
    })
}
