//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod cluster;
mod run;
mod step;

pub use cluster::ClusterCommands;
pub use step::StepCommands;

use anyhow::{Context, Result};
use clap::Subcommand;
use sparkflow_core::domain::definition::PipelineDefinition;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Cluster management
    Cluster {
        #[command(subcommand)]
        command: ClusterCommands,
    },
    /// Step management
    Step {
        #[command(subcommand)]
        command: StepCommands,
    },
    /// Run the full pipeline: create, wait, submit, await, terminate
    Run {
        /// Path to a JSON pipeline definition (built-in definition if omitted)
        #[arg(short, long)]
        definition: Option<PathBuf>,

        /// Seconds between cluster readiness checks
        #[arg(long, default_value = "30")]
        interval: u64,

        /// Give up on readiness after this many checks
        #[arg(long)]
        max_polls: Option<u32>,

        /// Execution timeout for each task, in seconds
        #[arg(long)]
        task_timeout: Option<u64>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Cluster { command } => cluster::handle_cluster_command(command, config).await,
        Commands::Step { command } => step::handle_step_command(command, config).await,
        Commands::Run {
            definition,
            interval,
            max_polls,
            task_timeout,
            json,
        } => {
            let options = run::RunOptions {
                definition,
                interval,
                max_polls,
                task_timeout,
                json,
            };
            run::handle_run(options, config).await
        }
    }
}

/// Load a pipeline definition, falling back to the built-in one
pub(crate) fn load_definition(path: Option<&PathBuf>) -> Result<PipelineDefinition> {
    match path {
        Some(path) => PipelineDefinition::from_file(path)
            .with_context(|| format!("Failed to load definition {}", path.display())),
        None => Ok(PipelineDefinition::default()),
    }
}

/// Parse a single key=value pair
pub(crate) fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}
