//! Step command handlers
//!
//! Submit steps to a running cluster and follow them.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use sparkflow_core::domain::definition::{SparkSubmit, StepDefinition};
use sparkflow_core::domain::handle::{ClusterHandle, StepHandle};
use sparkflow_runner::StepSensor;
use std::path::PathBuf;
use std::time::Duration;

use super::{load_definition, parse_key_val};
use crate::config::Config;
use crate::output::{colorize_step_state, print_step};

/// Step subcommands
#[derive(Subcommand)]
pub enum StepCommands {
    /// Submit a step to a cluster
    ///
    /// Uses the step from the definition file, or builds a spark-submit step
    /// when --script is given.
    Submit {
        /// Cluster ID
        cluster_id: String,

        /// Path to a JSON pipeline definition
        #[arg(short, long, conflicts_with = "script")]
        definition: Option<PathBuf>,

        /// Spark script location to run with spark-submit
        #[arg(short, long)]
        script: Option<String>,

        /// Script arguments as key=value pairs, passed as --key value
        #[arg(short, long, value_parser = parse_key_val, requires = "script")]
        arg: Vec<(String, String)>,

        /// Step name
        #[arg(short, long, default_value = "Spark Job")]
        name: String,

        /// spark-submit deploy mode
        #[arg(long, default_value = "cluster", value_parser = ["cluster", "client"], requires = "script")]
        deploy_mode: String,
    },
    /// Show step status
    Status {
        /// Cluster ID
        cluster_id: String,

        /// Step ID
        step_id: String,
    },
    /// Block until the step completes or fails
    Wait {
        /// Cluster ID
        cluster_id: String,

        /// Step ID
        step_id: String,

        /// Seconds between checks
        #[arg(long, default_value = "30")]
        interval: u64,

        /// Seconds before giving up
        #[arg(long, default_value = "300")]
        timeout: u64,
    },
}

/// Handle step commands
pub async fn handle_step_command(command: StepCommands, config: &Config) -> Result<()> {
    match command {
        StepCommands::Submit {
            cluster_id,
            definition,
            script,
            arg,
            name,
            deploy_mode,
        } => {
            let step = match script {
                Some(script) => build_spark_step(&script, &deploy_mode, arg, &name),
                None => load_definition(definition.as_ref())?.step,
            };
            submit_step(config, &cluster_id, step).await
        }
        StepCommands::Status {
            cluster_id,
            step_id,
        } => step_status(config, &cluster_id, &step_id).await,
        StepCommands::Wait {
            cluster_id,
            step_id,
            interval,
            timeout,
        } => wait_for_step(config, &cluster_id, &step_id, interval, timeout).await,
    }
}

fn build_spark_step(
    script: &str,
    deploy_mode: &str,
    args: Vec<(String, String)>,
    name: &str,
) -> StepDefinition {
    args.into_iter()
        .fold(SparkSubmit::new(script).deploy_mode(deploy_mode), |submit, (key, value)| {
            submit.arg(key, value)
        })
        .into_step(name)
}

async fn submit_step(config: &Config, cluster_id: &str, step: StepDefinition) -> Result<()> {
    let cluster = ClusterHandle::new(cluster_id)?;
    let ids = config
        .client()
        .add_steps(&cluster, std::slice::from_ref(&step))
        .await?;

    println!("{}", "✓ Step submitted".green());
    for id in ids {
        println!("  ID:   {}", id.to_string().cyan());
    }
    println!("  Name: {}", step.name);
    println!("  Args: {}", step.hadoop_jar_step.args.join(" ").dimmed());
    Ok(())
}

async fn step_status(config: &Config, cluster_id: &str, step_id: &str) -> Result<()> {
    let cluster = ClusterHandle::new(cluster_id)?;
    let step = StepHandle::new(step_id)?;

    let described = config.client().describe_step(&cluster, &step).await?;
    print_step(&described);
    Ok(())
}

async fn wait_for_step(
    config: &Config,
    cluster_id: &str,
    step_id: &str,
    interval: u64,
    timeout: u64,
) -> Result<()> {
    if interval == 0 {
        anyhow::bail!("--interval must be greater than 0");
    }

    let cluster = ClusterHandle::new(cluster_id)?;
    let step = StepHandle::new(step_id)?;
    let sensor = StepSensor::new(
        config.client(),
        Duration::from_secs(interval),
        Duration::from_secs(timeout),
    );

    let described = sensor.wait_for_completion(&cluster, &step).await?;
    println!(
        "{} Step {} is {}",
        "✓".green(),
        described.id.to_string().cyan(),
        colorize_step_state(&described.status.state)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_spark_step() {
        let step = build_spark_step(
            "s3://bucket/etl.py",
            "cluster",
            vec![("output_location".to_string(), "s3://bucket/out/".to_string())],
            "etl",
        );

        assert_eq!(step.name, "etl");
        assert_eq!(
            step.hadoop_jar_step.args,
            vec![
                "spark-submit",
                "--deploy-mode",
                "cluster",
                "s3://bucket/etl.py",
                "--output_location",
                "s3://bucket/out/",
            ]
        );
    }

    #[test]
    fn test_build_spark_step_client_mode() {
        let step = build_spark_step("s3://bucket/etl.py", "client", Vec::new(), "etl");

        assert_eq!(
            step.hadoop_jar_step.args,
            vec!["spark-submit", "--deploy-mode", "client", "s3://bucket/etl.py"]
        );
    }
}
