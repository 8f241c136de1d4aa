//! Runner configuration
//!
//! Defines all configurable parameters for a pipeline run: where the
//! cluster-management API lives, how often to poll clusters and steps, and
//! how long tasks may take.

use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::PipelineSettings;

/// Runner configuration
///
/// All intervals and timeouts are configurable so the same binary can be
/// pointed at a slow production API or a local fake.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cluster-management API base URL (e.g., "http://localhost:8080")
    pub api_url: String,

    /// Delay between cluster readiness checks
    pub cluster_poll_interval: Duration,

    /// Give up waiting for readiness after this many checks (unbounded if unset)
    pub cluster_max_polls: Option<u32>,

    /// Delay between step status checks
    pub step_poke_interval: Duration,

    /// Maximum time the step sensor waits for a terminal state
    pub step_timeout: Duration,

    /// How many times the step sensor is retried after failing
    pub step_retries: u32,

    /// Delay before retrying the step sensor
    pub step_retry_delay: Duration,

    /// Execution timeout applied to every task (none if unset)
    pub task_timeout: Option<Duration>,

    /// Pipeline definition file; the built-in definition is used if unset
    pub definition_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            cluster_poll_interval: Duration::from_secs(30),
            cluster_max_polls: None,
            step_poke_interval: Duration::from_secs(30),
            step_timeout: Duration::from_secs(300),
            step_retries: 1,
            step_retry_delay: Duration::from_secs(10),
            task_timeout: None,
            definition_path: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SPARKFLOW_API_URL (required)
    /// - CLUSTER_POLL_INTERVAL (optional, seconds, default: 30)
    /// - CLUSTER_MAX_POLLS (optional, default: unbounded)
    /// - STEP_POKE_INTERVAL (optional, seconds, default: 30)
    /// - STEP_TIMEOUT (optional, seconds, default: 300)
    /// - STEP_RETRIES (optional, default: 1)
    /// - STEP_RETRY_DELAY (optional, seconds, default: 10)
    /// - TASK_TIMEOUT (optional, seconds, default: none)
    /// - PIPELINE_DEFINITION (optional, path to a JSON definition)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup("SPARKFLOW_API_URL")
            .ok_or_else(|| anyhow::anyhow!("SPARKFLOW_API_URL environment variable not set"))?;

        let defaults = Self::new(api_url);

        let seconds = |key: &str| {
            lookup(key)
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
        };

        Ok(Self {
            cluster_poll_interval: seconds("CLUSTER_POLL_INTERVAL")
                .unwrap_or(defaults.cluster_poll_interval),
            cluster_max_polls: lookup("CLUSTER_MAX_POLLS").and_then(|s| s.parse::<u32>().ok()),
            step_poke_interval: seconds("STEP_POKE_INTERVAL")
                .unwrap_or(defaults.step_poke_interval),
            step_timeout: seconds("STEP_TIMEOUT").unwrap_or(defaults.step_timeout),
            step_retries: lookup("STEP_RETRIES")
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(defaults.step_retries),
            step_retry_delay: seconds("STEP_RETRY_DELAY").unwrap_or(defaults.step_retry_delay),
            task_timeout: seconds("TASK_TIMEOUT"),
            definition_path: lookup("PIPELINE_DEFINITION").map(PathBuf::from),
            ..defaults
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.cluster_poll_interval.is_zero() {
            anyhow::bail!("cluster_poll_interval must be greater than 0");
        }

        if self.step_poke_interval.is_zero() {
            anyhow::bail!("step_poke_interval must be greater than 0");
        }

        if self.cluster_max_polls == Some(0) {
            anyhow::bail!("cluster_max_polls must be greater than 0 when set");
        }

        if self.task_timeout.is_some_and(|t| t.is_zero()) {
            anyhow::bail!("task_timeout must be greater than 0 when set");
        }

        Ok(())
    }

    /// Timing and retry settings handed to the pipeline
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            cluster_poll_interval: self.cluster_poll_interval,
            cluster_max_polls: self.cluster_max_polls,
            step_poke_interval: self.step_poke_interval,
            step_timeout: self.step_timeout,
            step_retries: self.step_retries,
            step_retry_delay: self.step_retry_delay,
            task_timeout: self.task_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:8080".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cluster_poll_interval, Duration::from_secs(30));
        assert_eq!(config.step_poke_interval, Duration::from_secs(30));
        assert_eq!(config.step_timeout, Duration::from_secs(300));
        assert_eq!(config.step_retries, 1);
        assert_eq!(config.step_retry_delay, Duration::from_secs(10));
        assert!(config.cluster_max_polls.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.api_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        config.api_url = "https://emr-gateway.internal".to_string();
        assert!(config.validate().is_ok());

        config.cluster_poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        config.cluster_poll_interval = Duration::from_secs(30);
        config.cluster_max_polls = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup_requires_api_url() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SPARKFLOW_API_URL", "http://gateway:9000"),
            ("CLUSTER_POLL_INTERVAL", "5"),
            ("CLUSTER_MAX_POLLS", "40"),
            ("STEP_RETRIES", "3"),
            ("TASK_TIMEOUT", "3600"),
            ("PIPELINE_DEFINITION", "/etc/sparkflow/etl.json"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://gateway:9000");
        assert_eq!(config.cluster_poll_interval, Duration::from_secs(5));
        assert_eq!(config.cluster_max_polls, Some(40));
        assert_eq!(config.step_retries, 3);
        assert_eq!(config.task_timeout, Some(Duration::from_secs(3600)));
        assert_eq!(
            config.definition_path,
            Some(PathBuf::from("/etc/sparkflow/etl.json"))
        );
        // untouched values keep their defaults
        assert_eq!(config.step_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("SPARKFLOW_API_URL", "http://gateway:9000"),
            ("STEP_POKE_INTERVAL", "soon"),
        ]))
        .unwrap();
        assert_eq!(config.step_poke_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_pipeline_settings() {
        let mut config = Config::default();
        config.cluster_max_polls = Some(20);
        let settings = config.pipeline_settings();
        assert_eq!(settings.cluster_max_polls, Some(20));
        assert_eq!(settings.step_timeout, config.step_timeout);
    }
}
