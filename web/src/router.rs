use crate::controller::{health_check_controller, sse_controller};
use crate::{params, response, sse as sse_handler, AppState};
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here. The streaming
// connect endpoint is not listed - its response is an open event stream, not
// a JSON document.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Notification Platform API"
        ),
        paths(
            sse_controller::broadcast,
            sse_controller::send_to_connection,
            sse_controller::index,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                params::sse::NotificationParams,
                response::sse::BroadcastResponse,
                response::sse::SendResponse,
                response::sse::ConnectionsResponse,
                response::sse::ConnectionSummary,
            )
        ),
        tags(
            (name = "notify_platform", description = "Server-push notification API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(sse_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes())
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sse/connect", get(sse_handler::handler::connect))
        .route("/sse/broadcast", post(sse_controller::broadcast))
        .route(
            "/sse/send/:connection_id",
            post(sse_controller::send_to_connection),
        )
        .route("/sse/connections", get(sse_controller::index))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// Serves the static demo dashboard used to eyeball the event stream.
pub fn static_routes() -> Router {
    Router::new().nest_service("/", ServeDir::new("./public"))
}
