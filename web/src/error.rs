use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use sse::error::Error as SseError;

pub type Result<T> = core::result::Result<T, Error>;

/// Web-layer error: either a rejected request body or a connection-level
/// failure bubbled up from the `sse` layer.
#[derive(Debug)]
pub enum Error {
    Sse(SseError),
    Validation(String),
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl From<SseError> for Error {
    fn from(err: SseError) -> Self {
        Self::Sse(err)
    }
}

// A missing unicast target and an invalid body are client errors (422); a
// write failure or a failed connection setup is a server-side fault for the
// affected request (500). Broadcast never reaches this mapping - it reports
// per-connection failures in its 200 response body.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message.clone()),
            Error::Sse(SseError::ConnectionNotFound { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Connection not found".to_string(),
            ),
            Error::Sse(SseError::WriteFailed { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send message".to_string(),
            ),
            Error::Sse(SseError::ConnectionSetup) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to establish connection".to_string(),
            ),
        };

        (status, Json(json!({ "error": { "message": message } }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sse::connection::ConnectionId;

    #[test]
    fn test_not_found_maps_to_unprocessable_entity() {
        let response = Error::from(SseError::ConnectionNotFound {
            connection_id: ConnectionId::generate(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_write_failed_maps_to_internal_server_error() {
        let response = Error::from(SseError::WriteFailed {
            connection_id: ConnectionId::generate(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_maps_to_unprocessable_entity() {
        let response = Error::Validation("Message must not be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
