use anyhow::Result;
use clap::Parser;
use colored::*;

mod api_client;
mod output;
mod scenarios;
mod sse_client;

use api_client::ApiClient;
use output::print_test_summary;

#[derive(Parser)]
#[command(name = "sse-test-client")]
#[command(about = "SSE Integration Testing Tool")]
struct Cli {
    /// Base URL of the backend (e.g., http://localhost:3000)
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: String,

    /// Test scenario to run
    #[arg(long, value_enum, default_value = "all")]
    scenario: ScenarioChoice,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, PartialEq)]
enum ScenarioChoice {
    /// Test basic SSE connection and the connections listing
    Connection,
    /// Test broadcast delivery to multiple clients
    Broadcast,
    /// Test unicast delivery and the not-found path
    Unicast,
    /// Test failure isolation with a severed transport
    DeadConnection,
    /// Run all scenarios
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== SSE SCENARIOS ===".bright_white().bold());
    println!("{} Target: {}", "→".blue(), cli.base_url);

    let api = ApiClient::new(reqwest::Client::new(), cli.base_url.clone());
    let mut results = Vec::new();

    let run = |choice: ScenarioChoice| cli.scenario == choice || cli.scenario == ScenarioChoice::All;

    if run(ScenarioChoice::Connection) {
        results.push(scenarios::connection_test(&cli.base_url, &api).await?);
    }
    if run(ScenarioChoice::Broadcast) {
        results.push(scenarios::broadcast_test(&cli.base_url, &api).await?);
    }
    if run(ScenarioChoice::Unicast) {
        results.push(scenarios::unicast_test(&cli.base_url, &api).await?);
    }
    if run(ScenarioChoice::DeadConnection) {
        results.push(scenarios::dead_connection_test(&cli.base_url, &api).await?);
    }

    print_test_summary(&results);

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}
