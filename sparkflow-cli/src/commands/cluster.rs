//! Cluster command handlers
//!
//! Create, inspect, wait on and terminate clusters.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use sparkflow_core::domain::handle::ClusterHandle;
use sparkflow_runner::ClusterReadinessPoller;
use std::path::PathBuf;
use std::time::Duration;

use super::load_definition;
use crate::config::Config;
use crate::output::{colorize_cluster_state, print_cluster};

/// Cluster subcommands
#[derive(Subcommand)]
pub enum ClusterCommands {
    /// Provision a cluster from a definition
    Create {
        /// Path to a JSON pipeline definition (built-in cluster if omitted)
        #[arg(short, long)]
        definition: Option<PathBuf>,
    },
    /// Show cluster status
    Status {
        /// Cluster ID
        id: String,

        /// Print the raw description as JSON
        #[arg(long)]
        json: bool,
    },
    /// Block until the cluster is WAITING, or fail if it terminates
    Wait {
        /// Cluster ID
        id: String,

        /// Seconds between checks
        #[arg(long, default_value = "30")]
        interval: u64,

        /// Give up after this many checks
        #[arg(long)]
        max_polls: Option<u32>,
    },
    /// Terminate a cluster
    Terminate {
        /// Cluster ID
        id: String,
    },
}

/// Handle cluster commands
pub async fn handle_cluster_command(command: ClusterCommands, config: &Config) -> Result<()> {
    match command {
        ClusterCommands::Create { definition } => create_cluster(config, definition).await,
        ClusterCommands::Status { id, json } => cluster_status(config, &id, json).await,
        ClusterCommands::Wait {
            id,
            interval,
            max_polls,
        } => wait_for_cluster(config, &id, interval, max_polls).await,
        ClusterCommands::Terminate { id } => terminate_cluster(config, &id).await,
    }
}

async fn create_cluster(config: &Config, definition: Option<PathBuf>) -> Result<()> {
    let definition = load_definition(definition.as_ref())?;
    definition.cluster.validate()?;

    let handle = config.client().create_cluster(&definition.cluster).await?;

    println!("{}", "✓ Cluster requested".green());
    println!("  ID:   {}", handle.to_string().cyan());
    println!("  Name: {}", definition.cluster.name);
    Ok(())
}

async fn cluster_status(config: &Config, id: &str, json: bool) -> Result<()> {
    let handle = ClusterHandle::new(id)?;
    let cluster = config.client().describe_cluster(&handle).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cluster)?);
    } else {
        print_cluster(&cluster);
    }
    Ok(())
}

async fn wait_for_cluster(
    config: &Config,
    id: &str,
    interval: u64,
    max_polls: Option<u32>,
) -> Result<()> {
    if interval == 0 {
        anyhow::bail!("--interval must be greater than 0");
    }

    let handle = ClusterHandle::new(id)?;
    let poller = ClusterReadinessPoller::new(config.client(), Duration::from_secs(interval))
        .with_max_polls(max_polls);

    let cluster = poller.wait_until_ready(&handle).await?;

    println!(
        "{} Cluster {} is {}",
        "✓".green(),
        cluster.id.to_string().cyan(),
        colorize_cluster_state(&cluster.status.state)
    );
    Ok(())
}

async fn terminate_cluster(config: &Config, id: &str) -> Result<()> {
    let handle = ClusterHandle::new(id)?;
    config.client().terminate_cluster(&handle).await?;

    println!("{} Termination requested for {}", "✓".green(), handle.to_string().cyan());
    Ok(())
}
