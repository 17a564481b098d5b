use log::info;
use service::config::Config;
use service::logging::Logger;
use service::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = Config::new();

    Logger::init_logger(&config);

    info!(
        "Starting notification platform on {}:{} (heartbeat interval: {}ms)",
        config.interface, config.port, config.heartbeat_interval_millis
    );

    let app_state = AppState::new(config);

    web::init_server(app_state).await
}
