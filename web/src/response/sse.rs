//! Response DTOs for the SSE messaging endpoints.
//!
//! Field names are camelCase on the wire, matching what the frontend
//! EventSource dashboard consumes.

use serde::Serialize;
use utoipa::ToSchema;

/// Body of a successful `POST /sse/broadcast`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResponse {
    pub success: bool,
    pub message: String,
    /// Registry size after failed connections were torn down.
    pub active_connections: usize,
    pub sent_to: usize,
    pub failed_connections: usize,
}

/// Body of a successful `POST /sse/send/:connection_id`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    pub connection_id: String,
}

/// Body of `GET /sse/connections`: a snapshot of the registry.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsResponse {
    pub active_connections: usize,
    pub connections: Vec<ConnectionSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub connection_id: String,
    /// RFC 3339 instant at which the connection was registered.
    pub connected_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_response_uses_camel_case_keys() {
        let response = BroadcastResponse {
            success: true,
            message: "Broadcast sent".to_string(),
            active_connections: 2,
            sent_to: 2,
            failed_connections: 0,
        };
        let value = serde_json::to_value(&response).expect("response should serialize");

        assert_eq!(value["activeConnections"], 2);
        assert_eq!(value["sentTo"], 2);
        assert_eq!(value["failedConnections"], 0);
    }

    #[test]
    fn test_connection_summary_uses_camel_case_keys() {
        let summary = ConnectionSummary {
            connection_id: "conn_1_ab".to_string(),
            connected_at: "2026-01-01T00:00:00+00:00".to_string(),
        };
        let value = serde_json::to_value(&summary).expect("summary should serialize");

        assert_eq!(value["connectionId"], "conn_1_ab");
        assert!(value["connectedAt"].is_string());
    }
}
