#![cfg(not(tarpaulin_include))]

use glossary::{app, config::AppConfig};
use std::env;

/// Main entry point for the glossary web server
///
/// Takes an optional path to a JSON config file as its only argument;
/// without one the published glossary sheet is served on 127.0.0.1:3000.
/// Log verbosity follows `RUST_LOG` (default `info`).
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1) {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    app::run(config).await
}
