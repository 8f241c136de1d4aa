//! Sparkflow Runner binary
//!
//! Runs the whole pipeline once with settings from the environment and exits
//! non-zero when any task failed.

use anyhow::{Context, Result};
use sparkflow_client::{ClusterApi, HttpClusterClient};
use sparkflow_core::domain::definition::PipelineDefinition;
use sparkflow_runner::{Config, Pipeline, PipelineReport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sparkflow_runner=info,sparkflow_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sparkflow Runner");

    let config = load_config()?;
    info!(
        "Loaded configuration: api_url={}, cluster_poll_interval={:?}, step_timeout={:?}",
        config.api_url, config.cluster_poll_interval, config.step_timeout
    );

    let definition = match &config.definition_path {
        Some(path) => PipelineDefinition::from_file(path)
            .with_context(|| format!("Failed to load pipeline definition {}", path.display()))?,
        None => {
            info!("No PIPELINE_DEFINITION set, using the built-in definition");
            PipelineDefinition::default()
        }
    };

    let client: Arc<dyn ClusterApi> = Arc::new(HttpClusterClient::new(config.api_url.clone()));
    info!("Cluster API client initialized");

    let pipeline = Pipeline::new(client, definition, config.pipeline_settings());
    let report = pipeline.run().await;

    log_summary(&report);

    if !report.succeeded() {
        anyhow::bail!("Pipeline run {} failed", report.run_id);
    }

    Ok(())
}

/// Loads configuration from environment variables with fallback to defaults
fn load_config() -> Result<Config> {
    match Config::from_env() {
        Ok(config) => {
            config.validate()?;
            Ok(config)
        }
        Err(e) => {
            info!("Failed to load config from environment ({}), using defaults", e);
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn log_summary(report: &PipelineReport) {
    info!("Run {} summary:", report.run_id);
    for task in &report.tasks {
        match &task.error {
            Some(err) => error!(
                "  {:<22} {:?} after {} attempt(s): {}",
                task.name, task.status, task.attempts, err
            ),
            None => info!(
                "  {:<22} {:?} ({} attempt(s))",
                task.name, task.status, task.attempts
            ),
        }
    }

    let failed: Vec<&str> = report.failed_tasks().map(|t| t.name.as_str()).collect();
    if !failed.is_empty() {
        error!("Failed tasks: {}", failed.join(", "));
    }
}
