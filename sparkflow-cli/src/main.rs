//! Sparkflow CLI
//!
//! Command-line interface for running transient-cluster pipelines and
//! inspecting clusters and steps on the cluster-management API.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sparkflow")]
#[command(about = "Transient Spark cluster pipeline CLI", long_about = None)]
struct Cli {
    /// Cluster-management API URL
    #[arg(long, env = "SPARKFLOW_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress from the poller and sensor is reported through tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sparkflow_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config {
        api_url: cli.api_url,
    };

    handle_command(cli.command, &config).await
}
