#![cfg(not(tarpaulin_include))]

use clap::Parser;
use metricalc::CalculatorConfig;
use metricalc::app;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "metricalc-web")]
#[command(about = "JSON service for the marketing metric calculator", long_about = None)]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// JSON config with seed overrides and undo limit
    #[arg(short, long, env = "METRICALC_CONFIG")]
    config: Option<PathBuf>,
}

/// Main entry point for the calculator web service
///
/// Serves one shared calculator session over JSON until the process is
/// stopped. Logging follows `RUST_LOG`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = CalculatorConfig::load(args.config.as_deref())?;
    app::run(&args.bind, config).await
}
