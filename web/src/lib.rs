//! HTTP layer for the notification platform.
//!
//! Thin axum glue over the `sse` crate: the router, the streaming connect
//! handler, the JSON messaging controllers, request validation, and the
//! error-to-status mapping. All connection state lives in
//! [`service::AppState`]'s SSE manager; this crate never touches handles
//! directly.

use axum::http::{header, HeaderValue, Method};
use log::*;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub(crate) mod controller;
pub mod error;
pub(crate) mod params;
pub(crate) mod response;
pub mod router;
pub(crate) mod sse;

pub use error::Error;
pub use service::AppState;

/// Bind the configured interface/port and serve the router until a shutdown
/// signal arrives. Ctrl-c tears down every open SSE connection before the
/// process exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = app_state.config.clone();

    let origins = parse_allowed_origins(&config.allowed_origins);

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::CACHE_CONTROL]);

    let router = router::define_routes(app_state.clone()).layer(cors);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.interface, config.port)).await?;
    info!(
        "Server is listening for requests on http://{}:{}",
        config.interface, config.port
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(app_state))
        .await
}

/// Parse the configured CORS origins, skipping any that are not valid header
/// values. An empty result with a non-empty input is almost certainly a
/// misconfiguration, so it gets a summary warning of its own.
fn parse_allowed_origins(allowed_origins: &[String]) -> Vec<HeaderValue> {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid allowed origin: {origin}");
                None
            }
        })
        .collect();

    if origins.is_empty() && !allowed_origins.is_empty() {
        warn!(
            "0 of {} configured allowed origins are usable; CORS will reject every origin",
            allowed_origins.len()
        );
    }

    origins
}

async fn shutdown_signal(app_state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        return;
    }

    info!("Shutdown signal received");
    app_state.sse_manager.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins_keeps_valid_and_skips_invalid() {
        let origins = parse_allowed_origins(&[
            "http://localhost:3000".to_string(),
            "not a header value\u{0}".to_string(),
            "https://app.example.com".to_string(),
        ]);

        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("https://app.example.com"),
            ],
            "valid origins should survive, invalid ones should be skipped"
        );
    }

    #[test]
    fn test_parse_allowed_origins_all_invalid_yields_empty_list() {
        let origins = parse_allowed_origins(&["\u{0}".to_string(), "\u{1}".to_string()]);
        assert!(
            origins.is_empty(),
            "unusable origins must not produce header values"
        );
    }

    #[test]
    fn test_parse_allowed_origins_empty_input_is_fine() {
        assert!(parse_allowed_origins(&[]).is_empty());
    }
}
