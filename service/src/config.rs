use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::time::Duration;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections on
    #[arg(short, long, env, default_value = "0.0.0.0")]
    pub interface: String,

    /// The host TCP port to listen for incoming connections on
    #[arg(short, long, env, default_value_t = 3000)]
    pub port: u16,

    /// Milliseconds between heartbeat events sent on each open SSE connection
    #[arg(long, env = "HEARTBEAT_INTERVAL_MS", default_value_t = 30_000)]
    pub heartbeat_interval_millis: u64,

    /// The log level to set the server's logging to. It will log everything at
    /// the specified level and more severe.
    #[arg(short = 'l', long, env, default_value = "info")]
    pub log_level_filter: LevelFilter,
}

impl Config {
    pub fn new() -> Self {
        dotenv().ok();
        Config::parse()
    }

    /// The configured heartbeat interval as a `Duration`, shared by all connections.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_heartbeat_interval_is_thirty_seconds() {
        let config = Config::try_parse_from(["notify_platform_rs"])
            .expect("parsing with no arguments should succeed");
        assert_eq!(
            config.heartbeat_interval(),
            Duration::from_secs(30),
            "default heartbeat interval should be 30s"
        );
    }

    #[test]
    fn test_heartbeat_interval_flag_overrides_default() {
        let config = Config::try_parse_from([
            "notify_platform_rs",
            "--heartbeat-interval-millis",
            "250",
        ])
        .expect("parsing with an explicit interval should succeed");
        assert_eq!(config.heartbeat_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_allowed_origins_are_comma_delimited() {
        let config = Config::try_parse_from([
            "notify_platform_rs",
            "--allowed-origins",
            "http://a.example.com,http://b.example.com",
        ])
        .expect("parsing allowed origins should succeed");
        assert_eq!(
            config.allowed_origins,
            vec!["http://a.example.com", "http://b.example.com"]
        );
    }
}
