//! Cluster and step definitions
//!
//! Declarative descriptions of what to provision and what to run. Field names
//! serialize in PascalCase, matching the payloads the cluster-management API
//! accepts. Defaults reproduce the stock Spark ETL workflow: one on-demand
//! master, two spot core nodes and a single `spark-submit` step.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a pipeline definition file
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Failed to read definition file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse definition file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid definition: {0}")]
    Invalid(String),
}

/// Application installed on the cluster (e.g. Spark, Hadoop)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Application {
    pub name: String,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Purchasing option for an instance group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Market {
    OnDemand,
    Spot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceRole {
    Master,
    Core,
    Task,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceGroup {
    pub name: String,
    pub market: Market,
    pub instance_role: InstanceRole,
    pub instance_type: String,
    pub instance_count: u32,
}

/// Node layout and lifecycle flags of a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instances {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec2_subnet_id: Option<String>,
    pub instance_groups: Vec<InstanceGroup>,
    /// Keep the cluster in WAITING once it has no steps left
    pub keep_job_flow_alive_when_no_steps: bool,
    pub termination_protected: bool,
}

/// Everything needed to provision a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterDefinition {
    pub name: String,
    pub release_label: String,
    pub applications: Vec<Application>,
    pub instances: Instances,
    pub job_flow_role: String,
    pub service_role: String,
}

impl Default for ClusterDefinition {
    fn default() -> Self {
        Self {
            name: "EMR with airflow".to_string(),
            release_label: "emr-7.8.0".to_string(),
            applications: vec![Application::new("Spark"), Application::new("Hadoop")],
            instances: Instances {
                ec2_subnet_id: Some("subnet-06921e5fee25026bc".to_string()),
                instance_groups: vec![
                    InstanceGroup {
                        name: "Master nodes".to_string(),
                        market: Market::OnDemand,
                        instance_role: InstanceRole::Master,
                        instance_type: "c5.xlarge".to_string(),
                        instance_count: 1,
                    },
                    InstanceGroup {
                        name: "Core nodes".to_string(),
                        market: Market::Spot,
                        instance_role: InstanceRole::Core,
                        instance_type: "c5.xlarge".to_string(),
                        instance_count: 2,
                    },
                ],
                keep_job_flow_alive_when_no_steps: true,
                termination_protected: false,
            },
            job_flow_role: "AmazonEMR-InstanceProfile-20250311T191608".to_string(),
            service_role: "EMRserviceRole".to_string(),
        }
    }
}

impl ClusterDefinition {
    /// Checks the definition can be submitted
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::Invalid("cluster name cannot be empty".to_string()));
        }

        let masters = self
            .instances
            .instance_groups
            .iter()
            .filter(|g| g.instance_role == InstanceRole::Master)
            .count();
        if masters != 1 {
            return Err(DefinitionError::Invalid(format!(
                "expected exactly one MASTER instance group, found {}",
                masters
            )));
        }

        if let Some(group) = self
            .instances
            .instance_groups
            .iter()
            .find(|g| g.instance_count == 0)
        {
            return Err(DefinitionError::Invalid(format!(
                "instance group '{}' must have at least one instance",
                group.name
            )));
        }

        Ok(())
    }
}

/// What the cluster does when a step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionOnFailure {
    Continue,
    CancelAndWait,
    TerminateCluster,
    TerminateJobFlow,
}

/// JAR invocation executed by a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HadoopJarStep {
    pub jar: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// A unit of work to submit to a running cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StepDefinition {
    pub name: String,
    pub action_on_failure: ActionOnFailure,
    pub hadoop_jar_step: HadoopJarStep,
}

impl Default for StepDefinition {
    fn default() -> Self {
        SparkSubmit::new("s3://af-emr-branesh/script/etl_job.py")
            .arg(
                "source_input1",
                "s3://af-emr-branesh/input_datas/green_taxi_trip_may_2024.csv",
            )
            .arg("source_input2", "s3://af-emr-branesh/input_datas/trip_type.csv")
            .arg("output_location", "s3://af-emr-branesh/outputs/")
            .into_step("Spark Job")
    }
}

/// Builder for `spark-submit` steps run through `command-runner.jar`
#[derive(Debug, Clone)]
pub struct SparkSubmit {
    script: String,
    deploy_mode: String,
    args: Vec<(String, String)>,
}

impl SparkSubmit {
    pub const COMMAND_RUNNER: &'static str = "command-runner.jar";

    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            deploy_mode: "cluster".to_string(),
            args: Vec::new(),
        }
    }

    pub fn deploy_mode(mut self, mode: impl Into<String>) -> Self {
        self.deploy_mode = mode.into();
        self
    }

    /// Adds a `--key value` pair passed to the script
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((key.into(), value.into()));
        self
    }

    /// Full argument vector handed to command-runner
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![
            "spark-submit".to_string(),
            "--deploy-mode".to_string(),
            self.deploy_mode.clone(),
            self.script.clone(),
        ];
        for (key, value) in &self.args {
            args.push(format!("--{}", key));
            args.push(value.clone());
        }
        args
    }

    pub fn into_step(self, name: impl Into<String>) -> StepDefinition {
        StepDefinition {
            name: name.into(),
            action_on_failure: ActionOnFailure::Continue,
            hadoop_jar_step: HadoopJarStep {
                jar: Self::COMMAND_RUNNER.to_string(),
                args: self.command_args(),
            },
        }
    }
}

/// Cluster plus the single step the pipeline runs on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PipelineDefinition {
    #[serde(default)]
    pub cluster: ClusterDefinition,
    #[serde(default)]
    pub step: StepDefinition,
}

impl PipelineDefinition {
    /// Loads and validates a definition from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: display.clone(),
            source,
        })?;

        let definition: PipelineDefinition =
            serde_json::from_str(&raw).map_err(|source| DefinitionError::Parse {
                path: display,
                source,
            })?;

        definition.cluster.validate()?;
        Ok(definition)
    }
}
