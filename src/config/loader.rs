// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_DEPENDENCY_TIMEOUT, DEFAULT_EVENT_LOG_CAPACITY, DEFAULT_RESOURCE_TIMEOUT};
use crate::engine::RoutingPolicy;
use crate::environment::{AccessMode, ResourceSpec};
use crate::errors::FailurePolicy;
use crate::types::{Payload, Task};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for a conclave runtime.
///
/// Describes the orchestrator and environment options, the built-in workers to register,
/// the resources to create up front, and an optional workload of tasks.
///
/// # Example
/// ```yaml
/// orchestrator:
///   dependency_timeout_ms: 300000
///   routing: substring
///   parallel_failures: report
/// environment:
///   event_log_capacity: 10000
///   resource_timeout_ms: 30000
/// workers:
///   - id: analyst
///     kind: echo
///     capabilities: [analysis]
/// resources:
///   - name: ledger
///     type: document
///     access_mode: exclusive
/// tasks:
///   - id: t1
///     type: market_analysis
///     description: size the market
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub orchestrator: OrchestratorOptions,
    #[serde(default)]
    pub environment: EnvironmentOptions,
    #[serde(default)]
    pub workers: Vec<WorkerConfig>,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

/// Orchestrator-level options.
///
/// # Fields
/// * `dependency_timeout_ms` - Budget for dependency gating (defaults to 300 s)
/// * `routing` - Capability routing policy (defaults to `substring`)
/// * `parallel_failures` - Whether parallel workflows report or drop raised failures
#[derive(Debug, Default, Deserialize)]
pub struct OrchestratorOptions {
    pub dependency_timeout_ms: Option<u64>,
    #[serde(default)]
    pub routing: RoutingPolicy,
    #[serde(default)]
    pub parallel_failures: FailurePolicy,
}

impl OrchestratorOptions {
    pub fn dependency_timeout(&self) -> Duration {
        self.dependency_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEPENDENCY_TIMEOUT)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EnvironmentOptions {
    pub event_log_capacity: Option<usize>,
    pub resource_timeout_ms: Option<u64>,
}

impl EnvironmentOptions {
    pub fn event_log_capacity(&self) -> usize {
        self.event_log_capacity.unwrap_or(DEFAULT_EVENT_LOG_CAPACITY)
    }

    pub fn resource_timeout(&self) -> Duration {
        self.resource_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RESOURCE_TIMEOUT)
    }
}

/// Configuration for a single built-in worker.
///
/// # Example
/// ```yaml
/// id: "gate"
/// kind: condition
/// capabilities: [gate]
/// options:
///   field: approved
/// ```
#[derive(Debug, Deserialize)]
pub struct WorkerConfig {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>, // worker-specific options
}

#[derive(Debug, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub access_mode: AccessMode,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    pub owner: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub metadata: Payload,
}

fn default_capacity() -> usize {
    1
}

impl ResourceConfig {
    pub fn to_spec(&self) -> ResourceSpec {
        let spec = ResourceSpec::new(&self.name, &self.resource_type, self.access_mode)
            .with_capacity(self.capacity)
            .with_data(self.data.clone())
            .with_metadata(self.metadata.clone());
        match &self.owner {
            Some(owner) => spec.owned_by(owner),
            None => spec,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input: Payload,
    #[serde(default)]
    pub depends_on: Vec<String>, // defaults empty
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub priority: i32,
}

impl TaskConfig {
    pub fn to_task(&self) -> Task {
        let task = Task::new(&self.task_type, &self.description)
            .with_id(&self.id)
            .with_input(self.input.clone())
            .with_priority(self.priority)
            .depends_on(self.depends_on.iter().cloned());
        match &self.assigned_to {
            Some(worker_id) => task.assigned_to(worker_id),
            None => task,
        }
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a config from a YAML file
///
/// This function loads the configuration and validates worker ids, worker kinds,
/// resource capacities and the task dependency graph.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
) -> Result<Config, Box<dyn std::error::Error>> {
    let cfg = load_config(path)?;

    if let Err(validation_errors) = crate::config::validate_config(&cfg) {
        let error_messages: Vec<String> = validation_errors.iter().map(|e| e.to_string()).collect();
        let combined_error = format!(
            "Configuration validation failed:\n{}",
            error_messages.join("\n")
        );
        return Err(combined_error.into());
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
orchestrator:
  dependency_timeout_ms: 1500
  routing: most_specific
  parallel_failures: drop
workers:
  - id: analyst
    kind: echo
    capabilities: [analysis, market]
resources:
  - name: ledger
    type: document
    access_mode: shared
    capacity: 2
    data: { balance: 10 }
tasks:
  - id: t1
    type: market_analysis
    input: { region: emea }
  - id: t2
    type: market_analysis
    depends_on: [t1]
    assigned_to: analyst
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.orchestrator.dependency_timeout(), Duration::from_millis(1500));
        assert_eq!(cfg.orchestrator.routing, RoutingPolicy::MostSpecific);
        assert_eq!(cfg.orchestrator.parallel_failures, FailurePolicy::Drop);
        assert_eq!(cfg.workers[0].capabilities, vec!["analysis", "market"]);
        assert_eq!(cfg.resources[0].access_mode, AccessMode::Shared);
        assert_eq!(cfg.resources[0].data, json!({"balance": 10}));
        assert_eq!(cfg.tasks[1].depends_on, vec!["t1"]);

        let task = cfg.tasks[1].to_task();
        assert_eq!(task.id, "t2");
        assert_eq!(task.assigned_to.as_deref(), Some("analyst"));
        assert_eq!(cfg.tasks[0].to_task().input["region"], json!("emea"));
    }

    #[test]
    fn defaults_apply_to_empty_config() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.orchestrator.dependency_timeout(), DEFAULT_DEPENDENCY_TIMEOUT);
        assert_eq!(cfg.orchestrator.routing, RoutingPolicy::Substring);
        assert_eq!(cfg.orchestrator.parallel_failures, FailurePolicy::Report);
        assert_eq!(cfg.environment.event_log_capacity(), 10_000);
        assert_eq!(cfg.environment.resource_timeout(), DEFAULT_RESOURCE_TIMEOUT);
        assert!(cfg.workers.is_empty());
    }

    #[test]
    fn resource_config_defaults_owner_and_capacity() {
        let yaml = r#"
name: board
type: whiteboard
access_mode: read_only
"#;
        let resource: ResourceConfig = serde_yaml::from_str(yaml).unwrap();
        let spec = resource.to_spec();
        assert_eq!(spec.capacity, 1);
        assert_eq!(spec.owner, "system");
        assert_eq!(spec.access_mode, AccessMode::ReadOnly);
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let yaml = r#"
workers:
  - id: analyst
    kind: echo
    capabilities: [analysis]
tasks:
  - id: a
    type: analysis
  - id: b
    type: analysis
    depends_on: [a]
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let result = load_and_validate_config(file.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_and_validate_cyclic_config() {
        let yaml = r#"
tasks:
  - id: a
    type: analysis
    depends_on: [b]
  - id: b
    type: analysis
    depends_on: [a]
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let result = load_and_validate_config(file.path());
        assert!(result.is_err());
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("Cyclic dependency detected"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(dir.path().join("absent.yaml")).is_err());
    }
}
