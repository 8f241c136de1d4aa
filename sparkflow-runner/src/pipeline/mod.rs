//! Pipeline runner
//!
//! Drives one transient-cluster run:
//!
//! ```text
//! create_cluster -> check_cluster_status -> add_spark_job -> step_status -> terminate_cluster
//! ```
//!
//! Values flow forward directly (cluster handle, step handle). A failed task
//! marks every later task upstream-failed, except `terminate_cluster`, which
//! runs whenever a cluster was created.

mod report;
mod task;

pub use report::{PipelineReport, TaskRecord, TaskStatus};
pub use task::{TaskError, TaskPolicy, run_task};

use sparkflow_client::ClusterApi;
use sparkflow_core::domain::definition::PipelineDefinition;
use sparkflow_core::domain::handle::{ClusterHandle, StepHandle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::scheduler::{ClusterReadinessPoller, StepSensor};

pub const CREATE_CLUSTER: &str = "create_cluster";
pub const CHECK_CLUSTER_STATUS: &str = "check_cluster_status";
pub const ADD_SPARK_JOB: &str = "add_spark_job";
pub const STEP_STATUS: &str = "step_status";
pub const TERMINATE_CLUSTER: &str = "terminate_cluster";

/// Task names in execution order
pub const TASKS: [&str; 5] = [
    CREATE_CLUSTER,
    CHECK_CLUSTER_STATUS,
    ADD_SPARK_JOB,
    STEP_STATUS,
    TERMINATE_CLUSTER,
];

/// Timing and retry settings for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub cluster_poll_interval: Duration,
    pub cluster_max_polls: Option<u32>,
    pub step_poke_interval: Duration,
    pub step_timeout: Duration,
    pub step_retries: u32,
    pub step_retry_delay: Duration,
    pub task_timeout: Option<Duration>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            cluster_poll_interval: Duration::from_secs(30),
            cluster_max_polls: None,
            step_poke_interval: Duration::from_secs(30),
            step_timeout: Duration::from_secs(300),
            step_retries: 1,
            step_retry_delay: Duration::from_secs(10),
            task_timeout: None,
        }
    }
}

pub struct Pipeline {
    api: Arc<dyn ClusterApi>,
    definition: PipelineDefinition,
    settings: PipelineSettings,
    poller: ClusterReadinessPoller,
    sensor: StepSensor,
}

impl Pipeline {
    pub fn new(
        api: Arc<dyn ClusterApi>,
        definition: PipelineDefinition,
        settings: PipelineSettings,
    ) -> Self {
        let poller = ClusterReadinessPoller::new(api.clone(), settings.cluster_poll_interval)
            .with_max_polls(settings.cluster_max_polls);
        let sensor = StepSensor::new(
            api.clone(),
            settings.step_poke_interval,
            settings.step_timeout,
        );

        Self {
            api,
            definition,
            settings,
            poller,
            sensor,
        }
    }

    /// Runs every task and returns the report
    ///
    /// Never returns early on failure; check [`PipelineReport::succeeded`].
    pub async fn run(&self) -> PipelineReport {
        let mut report = PipelineReport::new();
        info!(
            "Starting pipeline run {} for cluster '{}'",
            report.run_id, self.definition.cluster.name
        );

        let cluster = match self.create_cluster(&mut report).await {
            Some(cluster) => cluster,
            None => {
                for name in [CHECK_CLUSTER_STATUS, ADD_SPARK_JOB, STEP_STATUS] {
                    report.push(TaskRecord::not_run(name, TaskStatus::UpstreamFailed));
                }
                warn!("No cluster was created; skipping {}", TERMINATE_CLUSTER);
                report.push(TaskRecord::not_run(TERMINATE_CLUSTER, TaskStatus::Skipped));
                report.finish();
                return report;
            }
        };

        let ready = self.check_cluster_status(&mut report, &cluster).await;

        let step = if ready {
            self.add_spark_job(&mut report, &cluster).await
        } else {
            report.push(TaskRecord::not_run(ADD_SPARK_JOB, TaskStatus::UpstreamFailed));
            None
        };

        match &step {
            Some(step) => self.step_status(&mut report, &cluster, step).await,
            None => report.push(TaskRecord::not_run(STEP_STATUS, TaskStatus::UpstreamFailed)),
        }

        self.terminate_cluster(&mut report, &cluster).await;

        report.finish();
        info!(
            "Pipeline run {} finished: {}",
            report.run_id,
            if report.succeeded() { "success" } else { "failure" }
        );
        report
    }

    fn default_policy(&self) -> TaskPolicy {
        TaskPolicy::with_timeout(self.settings.task_timeout)
    }

    async fn create_cluster(&self, report: &mut PipelineReport) -> Option<ClusterHandle> {
        let api = self.api.as_ref();
        let definition = &self.definition.cluster;

        let (result, record) = run_task(CREATE_CLUSTER, self.default_policy(), move || async move {
            definition
                .validate()
                .map_err(|e| TaskError::Invalid(e.to_string()))?;
            Ok::<_, TaskError>(api.create_cluster(definition).await?)
        })
        .await;
        report.push(record);

        let cluster = result.ok()?;
        info!("Created cluster {}", cluster);
        report.cluster = Some(cluster.clone());
        Some(cluster)
    }

    async fn check_cluster_status(
        &self,
        report: &mut PipelineReport,
        cluster: &ClusterHandle,
    ) -> bool {
        let poller = &self.poller;

        let (result, record) =
            run_task(CHECK_CLUSTER_STATUS, self.default_policy(), move || async move {
                Ok::<_, TaskError>(poller.wait_until_ready(cluster).await?)
            })
            .await;
        report.push(record);

        result.is_ok()
    }

    async fn add_spark_job(
        &self,
        report: &mut PipelineReport,
        cluster: &ClusterHandle,
    ) -> Option<StepHandle> {
        let api = self.api.as_ref();
        let steps = std::slice::from_ref(&self.definition.step);

        let (result, record) = run_task(ADD_SPARK_JOB, self.default_policy(), move || async move {
            let ids = api.add_steps(cluster, steps).await?;
            ids.into_iter().next().ok_or_else(|| {
                TaskError::Invalid(format!("No step id returned for cluster {}", cluster))
            })
        })
        .await;
        report.push(record);

        let step = result.ok()?;
        info!("Submitted step {} to cluster {}", step, cluster);
        report.step = Some(step.clone());
        Some(step)
    }

    async fn step_status(
        &self,
        report: &mut PipelineReport,
        cluster: &ClusterHandle,
        step: &StepHandle,
    ) {
        let sensor = &self.sensor;
        let policy = TaskPolicy {
            timeout: self.settings.task_timeout,
            retries: self.settings.step_retries,
            retry_delay: self.settings.step_retry_delay,
        };

        let (_, record) = run_task(STEP_STATUS, policy, move || async move {
            Ok::<_, TaskError>(sensor.wait_for_completion(cluster, step).await?)
        })
        .await;
        report.push(record);
    }

    async fn terminate_cluster(&self, report: &mut PipelineReport, cluster: &ClusterHandle) {
        let api = self.api.as_ref();

        let (_, record) = run_task(TERMINATE_CLUSTER, self.default_policy(), move || async move {
            Ok::<_, TaskError>(api.terminate_cluster(cluster).await?)
        })
        .await;
        report.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClusterApi;

    fn pipeline(api: &Arc<ScriptedClusterApi>, settings: PipelineSettings) -> Pipeline {
        Pipeline::new(api.clone(), PipelineDefinition::default(), settings)
    }

    fn statuses(report: &PipelineReport) -> Vec<(&str, TaskStatus)> {
        report
            .tasks
            .iter()
            .map(|t| (t.name.as_str(), t.status))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_path() {
        let api = Arc::new(
            ScriptedClusterApi::new()
                .cluster_states(&["STARTING", "BOOTSTRAPPING", "WAITING"])
                .step_states(&["PENDING", "RUNNING", "COMPLETED"]),
        );

        let report = pipeline(&api, PipelineSettings::default()).run().await;

        assert!(report.succeeded());
        assert_eq!(
            statuses(&report),
            TASKS.iter().map(|t| (*t, TaskStatus::Success)).collect::<Vec<_>>()
        );
        assert_eq!(report.cluster.as_ref().unwrap().as_str(), "j-TEST");
        assert_eq!(report.step.as_ref().unwrap().as_str(), "s-TEST");
        assert_eq!(api.count("terminate_cluster"), 1);
        assert_eq!(api.calls().first(), Some(&"create_cluster"));
        assert_eq!(api.calls().last(), Some(&"terminate_cluster"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cluster_terminated_still_runs_teardown() {
        let api = Arc::new(ScriptedClusterApi::new().cluster_states(&["STARTING", "TERMINATED"]));

        let report = pipeline(&api, PipelineSettings::default()).run().await;

        assert!(!report.succeeded());
        assert_eq!(
            statuses(&report),
            vec![
                (CREATE_CLUSTER, TaskStatus::Success),
                (CHECK_CLUSTER_STATUS, TaskStatus::Failed),
                (ADD_SPARK_JOB, TaskStatus::UpstreamFailed),
                (STEP_STATUS, TaskStatus::UpstreamFailed),
                (TERMINATE_CLUSTER, TaskStatus::Success),
            ]
        );
        assert!(
            report
                .task(CHECK_CLUSTER_STATUS)
                .unwrap()
                .error
                .as_ref()
                .unwrap()
                .contains("terminated unexpectedly")
        );
        assert_eq!(api.count("add_steps"), 0);
        assert_eq!(api.count("terminate_cluster"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_failure_skips_teardown() {
        let api = Arc::new(ScriptedClusterApi::new().fail("create_cluster", 1, 400));

        let report = pipeline(&api, PipelineSettings::default()).run().await;

        assert!(!report.succeeded());
        assert_eq!(report.task(CREATE_CLUSTER).unwrap().status, TaskStatus::Failed);
        assert_eq!(
            report.task(TERMINATE_CLUSTER).unwrap().status,
            TaskStatus::Skipped
        );
        assert!(report.cluster.is_none());
        assert_eq!(api.calls(), vec!["create_cluster"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_definition_is_not_submitted() {
        let api = Arc::new(ScriptedClusterApi::new());
        let mut definition = PipelineDefinition::default();
        definition.cluster.instances.instance_groups.clear();

        let report = Pipeline::new(api.clone(), definition, PipelineSettings::default())
            .run()
            .await;

        assert_eq!(report.task(CREATE_CLUSTER).unwrap().status, TaskStatus::Failed);
        assert_eq!(api.count("create_cluster"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_failure_is_retried_once() {
        let api = Arc::new(ScriptedClusterApi::new().step_states(&["RUNNING", "FAILED"]));

        let report = pipeline(&api, PipelineSettings::default()).run().await;

        let step_status = report.task(STEP_STATUS).unwrap();
        assert_eq!(step_status.status, TaskStatus::Failed);
        assert_eq!(step_status.attempts, 2);
        // RUNNING, FAILED on the first attempt; FAILED again on the retry
        assert_eq!(api.count("describe_step"), 3);
        assert_eq!(
            report.task(TERMINATE_CLUSTER).unwrap().status,
            TaskStatus::Success
        );
        assert!(!report.succeeded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_timeout_is_not_retried() {
        let api = Arc::new(ScriptedClusterApi::new().step_states(&["RUNNING"]));
        let start = tokio::time::Instant::now();

        let report = pipeline(&api, PipelineSettings::default()).run().await;

        let step_status = report.task(STEP_STATUS).unwrap();
        assert_eq!(step_status.status, TaskStatus::Failed);
        assert_eq!(step_status.attempts, 1);
        assert!(step_status.error.as_ref().unwrap().contains("still not finished"));
        // pokes at 0, 30, ..., 300s
        assert_eq!(api.count("describe_step"), 11);
        assert_eq!(start.elapsed(), Duration::from_secs(300));
        assert_eq!(
            report.task(TERMINATE_CLUSTER).unwrap().status,
            TaskStatus::Success
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_retry_recovers() {
        let api = Arc::new(
            ScriptedClusterApi::new()
                .step_states(&["RUNNING", "COMPLETED"])
                .fail("describe_step", 1, 503),
        );

        let report = pipeline(&api, PipelineSettings::default()).run().await;

        assert!(report.succeeded());
        assert_eq!(report.task(STEP_STATUS).unwrap().attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_timeout_caps_unbounded_polling() {
        let api = Arc::new(ScriptedClusterApi::new().cluster_states(&["STARTING"]));
        let settings = PipelineSettings {
            task_timeout: Some(Duration::from_secs(600)),
            ..PipelineSettings::default()
        };

        let report = pipeline(&api, settings).run().await;

        let check = report.task(CHECK_CLUSTER_STATUS).unwrap();
        assert_eq!(check.status, TaskStatus::Failed);
        assert!(check.error.as_ref().unwrap().contains("timed out"));
        assert_eq!(api.count("terminate_cluster"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_polls_limits_readiness_wait() {
        let api = Arc::new(ScriptedClusterApi::new().cluster_states(&["BOOTSTRAPPING"]));
        let settings = PipelineSettings {
            cluster_max_polls: Some(4),
            ..PipelineSettings::default()
        };

        let report = pipeline(&api, settings).run().await;

        assert_eq!(
            report.task(CHECK_CLUSTER_STATUS).unwrap().status,
            TaskStatus::Failed
        );
        assert_eq!(api.describe_cluster_calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_failure_fails_run() {
        let api = Arc::new(ScriptedClusterApi::new().fail("terminate_cluster", 1, 500));

        let report = pipeline(&api, PipelineSettings::default()).run().await;

        assert_eq!(
            report.task(STEP_STATUS).unwrap().status,
            TaskStatus::Success
        );
        assert_eq!(
            report.task(TERMINATE_CLUSTER).unwrap().status,
            TaskStatus::Failed
        );
        assert!(!report.succeeded());
    }
}
