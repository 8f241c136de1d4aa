//! Terminal rendering for clusters, steps and run reports

use colored::*;
use sparkflow_core::domain::cluster::{Cluster, ClusterState};
use sparkflow_core::domain::step::{Step, StepState};
use sparkflow_runner::{PipelineReport, TaskStatus};

/// Print cluster details
pub fn print_cluster(cluster: &Cluster) {
    println!("{}", "Cluster Details:".bold());
    println!("  ID:      {}", cluster.id.to_string().cyan());
    if !cluster.name.is_empty() {
        println!("  Name:    {}", cluster.name);
    }
    println!("  State:   {}", colorize_cluster_state(&cluster.status.state));

    if let Some(reason) = &cluster.status.state_change_reason {
        if let Some(code) = &reason.code {
            println!("  Reason:  {}", code.dimmed());
        }
        if let Some(message) = &reason.message {
            println!("  Message: {}", message.dimmed());
        }
    }
}

/// Print step details
pub fn print_step(step: &Step) {
    println!("{}", "Step Details:".bold());
    println!("  ID:      {}", step.id.to_string().cyan());
    if !step.name.is_empty() {
        println!("  Name:    {}", step.name);
    }
    println!("  State:   {}", colorize_step_state(&step.status.state));

    if let Some(details) = &step.status.failure_details {
        println!("\n{}", "Failure:".bold());
        println!("  {}", details.summary().red());
        if let Some(log_file) = &details.log_file {
            println!("  Logs: {}", log_file.dimmed());
        }
    }
}

/// Print the per-task outcome of a pipeline run
pub fn print_report(report: &PipelineReport) {
    println!(
        "{} {}",
        "Pipeline run".bold(),
        report.run_id.to_string().dimmed()
    );
    if let Some(cluster) = &report.cluster {
        println!("  Cluster: {}", cluster.to_string().cyan());
    }
    if let Some(step) = &report.step {
        println!("  Step:    {}", step.to_string().cyan());
    }
    println!();

    for task in &report.tasks {
        println!(
            "  {} {:<22} {}",
            "▸".cyan(),
            task.name,
            colorize_task_status(task.status)
        );
        if task.attempts > 1 {
            println!("      attempts: {}", task.attempts);
        }
        if let (Some(started), Some(finished)) = (task.started_at, task.finished_at) {
            let seconds = finished.signed_duration_since(started).num_seconds();
            println!("      duration: {}s", seconds.to_string().dimmed());
        }
        if let Some(error) = &task.error {
            println!("      {}", error.red());
        }
    }

    println!();
    if report.succeeded() {
        println!("{}", "✓ Pipeline succeeded".green().bold());
    } else {
        println!("{}", "✗ Pipeline failed".red().bold());
    }
}

/// Colorize cluster state for display
pub fn colorize_cluster_state(state: &ClusterState) -> ColoredString {
    let state_str = state.to_string();
    match state {
        ClusterState::Waiting => state_str.green(),
        ClusterState::Running => state_str.cyan(),
        ClusterState::Starting | ClusterState::Bootstrapping => state_str.yellow(),
        ClusterState::Terminating => state_str.dimmed(),
        ClusterState::Terminated | ClusterState::TerminatedWithErrors => state_str.red(),
        ClusterState::Unknown(_) => state_str.normal(),
    }
}

/// Colorize step state for display
pub fn colorize_step_state(state: &StepState) -> ColoredString {
    let state_str = state.to_string();
    match state {
        StepState::Completed => state_str.green(),
        StepState::Running => state_str.cyan(),
        StepState::Pending | StepState::CancelPending => state_str.yellow(),
        StepState::Cancelled | StepState::Failed | StepState::Interrupted => state_str.red(),
        StepState::Unknown(_) => state_str.normal(),
    }
}

fn colorize_task_status(status: TaskStatus) -> ColoredString {
    let status_str = format!("{:?}", status);
    match status {
        TaskStatus::Success => status_str.green(),
        TaskStatus::Failed => status_str.red(),
        TaskStatus::UpstreamFailed => status_str.yellow(),
        TaskStatus::Skipped => status_str.dimmed(),
    }
}
