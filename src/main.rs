#![cfg(not(tarpaulin_include))]

use expense_tracker::Config;
use expense_tracker::app;

/// Main entry point for the web application
///
/// Reads the configuration from `EXPENSES_*` environment variables and the
/// optional positional arguments `[addr] [snapshot]`, then serves the tracker
/// until the server stops. Log output is controlled with `RUST_LOG`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    log::info!(
        "Starting expense tracker for collection '{}' ({})",
        config.collection,
        config
            .snapshot
            .as_ref()
            .map(|p| format!("snapshot at {}", p.display()))
            .unwrap_or_else(|| "in memory only".to_string())
    );

    app::run(config).await
}
