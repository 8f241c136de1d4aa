//! Full pipeline run

use anyhow::Result;
use sparkflow_runner::{Pipeline, PipelineSettings};
use std::path::PathBuf;
use std::time::Duration;

use super::load_definition;
use crate::config::Config;
use crate::output::print_report;

pub struct RunOptions {
    pub definition: Option<PathBuf>,
    pub interval: u64,
    pub max_polls: Option<u32>,
    pub task_timeout: Option<u64>,
    pub json: bool,
}

impl RunOptions {
    fn settings(&self) -> Result<PipelineSettings> {
        if self.interval == 0 {
            anyhow::bail!("--interval must be greater than 0");
        }
        if self.max_polls == Some(0) || self.task_timeout == Some(0) {
            anyhow::bail!("--max-polls and --task-timeout must be greater than 0");
        }

        Ok(PipelineSettings {
            cluster_poll_interval: Duration::from_secs(self.interval),
            cluster_max_polls: self.max_polls,
            task_timeout: self.task_timeout.map(Duration::from_secs),
            ..PipelineSettings::default()
        })
    }
}

pub async fn handle_run(options: RunOptions, config: &Config) -> Result<()> {
    let settings = options.settings()?;
    let definition = load_definition(options.definition.as_ref())?;

    let report = Pipeline::new(config.client(), definition, settings)
        .run()
        .await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.succeeded() {
        anyhow::bail!("Pipeline run {} failed", report.run_id);
    }
    Ok(())
}
