// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::backends::local::LocalWorkerFactory;
use crate::config::{dependency_order, Config, OrchestratorOptions};
use crate::engine::{Orchestrator, OrchestratorSettings};
use crate::environment::Environment;
use crate::types::Task;

/// A ready-to-run conclave: orchestrator, environment and the configured workload.
pub struct Runtime {
    pub orchestrator: Arc<Orchestrator>,
    pub environment: Arc<Environment>,
    /// Resource name to generated resource id.
    pub resources: HashMap<String, String>,
    /// Configured tasks, each after its dependencies and otherwise in declaration order.
    pub tasks: Vec<Task>,
}

/// Runtime builder - creates the environment, resources, workers and tasks from configuration.
///
/// # Examples
///
/// ```
/// use the_conclave::config::{Config, RuntimeBuilder};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), String> {
/// let config: Config = serde_yaml::from_str(r#"
/// workers:
///   - id: analyst
///     kind: echo
///     capabilities: [analysis]
/// "#).unwrap();
///
/// let runtime = RuntimeBuilder::from_config(&config).await?;
/// assert!(runtime.orchestrator.is_registered("analyst").await);
/// # Ok(())
/// # }
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build a complete runtime from configuration.
    ///
    /// The config should already have passed [`validate_config`](crate::config::validate_config);
    /// construction errors (unknown worker kind, duplicate worker, bad capacity) are still
    /// reported rather than ignored.
    pub async fn from_config(cfg: &Config) -> Result<Runtime, String> {
        let environment = Arc::new(Environment::with_options(
            cfg.environment.event_log_capacity(),
            cfg.environment.resource_timeout(),
        ));

        let mut resources = HashMap::new();
        for resource in &cfg.resources {
            let id = environment
                .create_resource(resource.to_spec())
                .await
                .map_err(|e| format!("Failed to create resource '{}': {}", resource.name, e))?;
            resources.insert(resource.name.clone(), id);
        }

        let orchestrator = Orchestrator::new(settings(&cfg.orchestrator)).with_environment(Arc::clone(&environment));
        for worker_config in &cfg.workers {
            let worker = LocalWorkerFactory::create_worker(worker_config)?;
            orchestrator
                .register_worker(worker)
                .await
                .map_err(|e| e.to_string())?;
        }

        Ok(Runtime {
            orchestrator: Arc::new(orchestrator),
            environment,
            resources,
            tasks: dependency_order(cfg).into_iter().map(|t| t.to_task()).collect(),
        })
    }
}

fn settings(options: &OrchestratorOptions) -> OrchestratorSettings {
    OrchestratorSettings {
        dependency_timeout: options.dependency_timeout(),
        routing: options.routing,
        parallel_failures: options.parallel_failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RoutingPolicy;
    use std::time::Duration;

    const YAML: &str = r#"
orchestrator:
  dependency_timeout_ms: 250
  routing: exact
workers:
  - id: analyst
    kind: echo
    capabilities: [analysis]
  - id: hub
    kind: synthesizer
    capabilities: [synthesis]
resources:
  - name: ledger
    type: document
    access_mode: exclusive
tasks:
  - id: t1
    type: analysis
  - id: t2
    type: analysis
    depends_on: [t1]
"#;

    #[tokio::test]
    async fn builds_runtime_from_yaml() {
        let cfg: Config = serde_yaml::from_str(YAML).unwrap();
        let runtime = RuntimeBuilder::from_config(&cfg).await.unwrap();

        let settings = runtime.orchestrator.settings();
        assert_eq!(settings.dependency_timeout, Duration::from_millis(250));
        assert_eq!(settings.routing, RoutingPolicy::Exact);

        assert!(runtime.orchestrator.is_registered("analyst").await);
        assert!(runtime.orchestrator.is_registered("hub").await);
        assert_eq!(runtime.tasks.len(), 2);
        assert_eq!(runtime.tasks[1].dependencies, vec!["t1"]);

        let ledger = &runtime.resources["ledger"];
        assert_eq!(runtime.environment.find_resource("ledger").await.as_ref(), Some(ledger));
    }

    #[tokio::test]
    async fn configured_workload_runs_in_order() {
        let cfg: Config = serde_yaml::from_str(YAML).unwrap();
        let runtime = RuntimeBuilder::from_config(&cfg).await.unwrap();

        let results = runtime
            .orchestrator
            .execute_sequential(runtime.tasks.clone(), true)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.worker_id == "analyst"));
    }

    #[tokio::test]
    async fn workload_runs_dependencies_declared_later_first() {
        let cfg: Config = serde_yaml::from_str(
            r#"
orchestrator:
  dependency_timeout_ms: 250
workers:
  - id: analyst
    kind: echo
    capabilities: [analysis]
tasks:
  - id: b
    type: analysis
    depends_on: [a]
  - id: a
    type: analysis
"#,
        )
        .unwrap();
        assert!(crate::config::validate_config(&cfg).is_ok());

        let runtime = RuntimeBuilder::from_config(&cfg).await.unwrap();
        let ids: Vec<&str> = runtime.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let results = runtime
            .orchestrator
            .execute_sequential(runtime.tasks.clone(), true)
            .await
            .unwrap();
        let finished: Vec<&str> = results.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(finished, vec!["a", "b"]);
        assert!(results.iter().all(|r| r.is_completed()));
    }

    #[tokio::test]
    async fn unknown_kind_fails_construction() {
        let cfg: Config = serde_yaml::from_str(
            r#"
workers:
  - id: seer
    kind: oracle
"#,
        )
        .unwrap();
        let err = RuntimeBuilder::from_config(&cfg).await.err().unwrap();
        assert!(err.contains("oracle"));
    }
}
