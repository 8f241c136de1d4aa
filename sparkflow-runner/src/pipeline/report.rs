//! Pipeline run report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sparkflow_core::domain::handle::{ClusterHandle, StepHandle};
use uuid::Uuid;

/// Outcome of a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Success,
    Failed,
    /// Not run because an earlier task failed
    UpstreamFailed,
    /// Not run because there was nothing to act on
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    pub status: TaskStatus,
    pub attempts: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl TaskRecord {
    /// Record for a task that never ran
    pub fn not_run(name: &str, status: TaskStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
            attempts: 0,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }
}

/// Everything that happened during one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub cluster: Option<ClusterHandle>,
    pub step: Option<StepHandle>,
    pub tasks: Vec<TaskRecord>,
}

impl PipelineReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            cluster: None,
            step: None,
            tasks: Vec::new(),
        }
    }

    pub fn push(&mut self, record: TaskRecord) {
        self.tasks.push(record);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when no task failed
    ///
    /// Tasks marked upstream-failed imply a failure elsewhere, so they do not
    /// need separate handling.
    pub fn succeeded(&self) -> bool {
        self.tasks.iter().all(|t| t.status != TaskStatus::Failed)
    }

    pub fn task(&self, name: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn failed_tasks(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter().filter(|t| t.status == TaskStatus::Failed)
    }
}

impl Default for PipelineReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_success() {
        let mut report = PipelineReport::new();
        report.push(TaskRecord {
            name: "create_cluster".to_string(),
            status: TaskStatus::Success,
            attempts: 1,
            started_at: Some(Utc::now()),
            finished_at: Some(Utc::now()),
            error: None,
        });
        report.push(TaskRecord::not_run("terminate_cluster", TaskStatus::Skipped));

        assert!(report.succeeded());
        assert_eq!(report.failed_tasks().count(), 0);
        assert_eq!(report.task("terminate_cluster").unwrap().attempts, 0);
    }

    #[test]
    fn test_report_failure() {
        let mut report = PipelineReport::new();
        report.push(TaskRecord {
            name: "step_status".to_string(),
            status: TaskStatus::Failed,
            attempts: 2,
            started_at: None,
            finished_at: None,
            error: Some("Step s-1 ended in state FAILED".to_string()),
        });

        assert!(!report.succeeded());
        assert_eq!(report.failed_tasks().next().unwrap().name, "step_status");
    }

    #[test]
    fn test_report_serializes() {
        let mut report = PipelineReport::new();
        report.cluster = Some(ClusterHandle::new("j-1").unwrap());
        report.finish();

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["cluster"], "j-1");
        assert!(value["finished_at"].is_string());
    }
}
