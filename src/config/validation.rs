//! Configuration validation for conclave runtimes.
//!
//! Validation accumulates every error it can find so a user sees all problems at once:
//!
//! 1. **Worker checks**: unique ids and known built-in kinds
//! 2. **Resource checks**: shared resources need a capacity of at least 1
//! 3. **Task checks**: unique ids, resolvable `depends_on`, known `assigned_to` workers
//! 4. **Cycle detection**: DFS with a recursion stack over the task dependency graph
//!
//! [`dependency_order`] schedules a validated task list so each task follows its dependencies.
//!
//! A dependency cycle would otherwise surface at run time as a `DependencyTimeout` after the
//! full wait budget, so it is rejected up front. Cycle detection only runs when the
//! references are valid, since it needs a well-formed graph.
//!
//! # Example
//! ```rust
//! use the_conclave::config::{validate_config, Config};
//!
//! let config: Config = serde_yaml::from_str(r#"
//! tasks:
//!   - id: a
//!     type: analysis
//!     depends_on: [missing]
//! "#).unwrap();
//!
//! let errors = validate_config(&config).unwrap_err();
//! assert_eq!(errors.len(), 1);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::backends::local::LocalWorkerFactory;
use crate::config::{Config, TaskConfig};
use crate::environment::AccessMode;
use crate::errors::ValidationError;
use crate::observability::messages::validation::*;
use crate::observability::messages::StructuredLog;

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    ValidationStarted {
        worker_count: config.workers.len(),
        task_count: config.tasks.len(),
    }
    .log();

    let mut errors = Vec::new();
    errors.extend(validate_workers(config));
    errors.extend(validate_resources(config));

    let reference_errors = validate_task_references(config);
    let references_ok = reference_errors.is_empty();
    errors.extend(reference_errors);

    if references_ok {
        if let Some(cycle) = find_dependency_cycle(config) {
            let path: Vec<&str> = cycle.iter().map(String::as_str).collect();
            CyclicDependencyDetected { cycle: &path }.log();
            errors.push(ValidationError::CyclicDependency { cycle });
        }
    }

    if errors.is_empty() {
        ValidationCompleted {
            worker_count: config.workers.len(),
            task_count: config.tasks.len(),
        }
        .log();
        Ok(())
    } else {
        for error in &errors {
            if !matches!(error, ValidationError::CyclicDependency { .. }) {
                ConfigEntryRejected { error }.log();
            }
        }
        ValidationFailed {
            error_count: errors.len(),
        }
        .log();
        Err(errors)
    }
}

fn validate_workers(config: &Config) -> Vec<ValidationError> {
    let mut seen_ids = HashSet::new();
    let mut errors = Vec::new();

    for worker in &config.workers {
        if !seen_ids.insert(&worker.id) {
            errors.push(ValidationError::DuplicateWorkerId {
                worker_id: worker.id.clone(),
            });
        }
        if !LocalWorkerFactory::is_known_kind(&worker.kind) {
            errors.push(ValidationError::UnknownWorkerKind {
                worker_id: worker.id.clone(),
                kind: worker.kind.clone(),
            });
        }
    }
    errors
}

fn validate_resources(config: &Config) -> Vec<ValidationError> {
    config
        .resources
        .iter()
        .filter(|r| r.access_mode == AccessMode::Shared && r.capacity == 0)
        .map(|r| ValidationError::ZeroCapacity {
            resource_name: r.name.clone(),
        })
        .collect()
}

/// Duplicate task ids, unresolved dependencies and unknown assignees.
fn validate_task_references(config: &Config) -> Vec<ValidationError> {
    let worker_ids: HashSet<&String> = config.workers.iter().map(|w| &w.id).collect();
    let task_ids: HashSet<&String> = config.tasks.iter().map(|t| &t.id).collect();
    let mut seen_ids = HashSet::new();
    let mut errors = Vec::new();

    for task in &config.tasks {
        if !seen_ids.insert(&task.id) {
            errors.push(ValidationError::DuplicateTaskId {
                task_id: task.id.clone(),
            });
        }
        for dependency in &task.depends_on {
            if !task_ids.contains(dependency) {
                errors.push(ValidationError::UnresolvedDependency {
                    task_id: task.id.clone(),
                    missing_dependency: dependency.clone(),
                });
            }
        }
        if let Some(worker_id) = &task.assigned_to {
            if !worker_ids.contains(worker_id) {
                errors.push(ValidationError::UnknownAssignee {
                    task_id: task.id.clone(),
                    worker_id: worker_id.clone(),
                });
            }
        }
    }
    errors
}

/// Find a dependency cycle, returned as a closed path (first id repeated at the end).
///
/// Three-colour DFS over the forward graph (dependency -> dependents). Reaching a node that
/// is still on the recursion stack closes a cycle.
fn find_dependency_cycle(config: &Config) -> Option<Vec<String>> {
    let mut graph: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in &config.tasks {
        graph.entry(task.id.as_str()).or_default();
    }
    for task in &config.tasks {
        for dependency in &task.depends_on {
            if let Some(dependents) = graph.get_mut(dependency.as_str()) {
                dependents.push(task.id.as_str());
            }
        }
    }

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    // Walk in declaration order so the reported cycle is stable.
    for task in &config.tasks {
        if !visited.contains(task.id.as_str()) {
            if let Some(cycle) = dfs_cycle_detection(&task.id, &graph, &mut visited, &mut rec_stack, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}

fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let cycle_start = path.iter().position(|x| *x == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> = path[cycle_start..].iter().map(|s| s.to_string()).collect();
                cycle.push(neighbor.to_string()); // Close the cycle
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

/// Configured tasks ordered so every task follows the tasks it depends on.
///
/// Kahn's algorithm; among ready tasks the earliest declared goes first, so a config that is
/// already in dependency order comes back unchanged. Unresolved dependencies are ignored and
/// tasks stuck on a cycle are appended in declaration order.
pub fn dependency_order(config: &Config) -> Vec<&TaskConfig> {
    let tasks = &config.tasks;
    let index: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .rev()
        .map(|(i, task)| (task.id.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; tasks.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (i, task) in tasks.iter().enumerate() {
        for dependency in &task.depends_on {
            if let Some(&d) = index.get(dependency.as_str()) {
                dependents[d].push(i);
                in_degree[i] += 1;
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..tasks.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut placed = vec![false; tasks.len()];
    let mut ordered = Vec::with_capacity(tasks.len());
    while let Some(i) = ready.pop_first() {
        placed[i] = true;
        ordered.push(&tasks[i]);
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    ordered.extend(tasks.iter().zip(placed).filter(|(_, placed)| !placed).map(|(task, _)| task));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResourceConfig, TaskConfig, WorkerConfig};

    fn task(id: &str, depends_on: Vec<&str>) -> TaskConfig {
        TaskConfig {
            id: id.to_string(),
            task_type: "analysis".to_string(),
            description: String::new(),
            input: Default::default(),
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            assigned_to: None,
            priority: 0,
        }
    }

    fn worker(id: &str, kind: &str) -> WorkerConfig {
        WorkerConfig {
            id: id.to_string(),
            kind: kind.to_string(),
            capabilities: vec!["analysis".to_string()],
            options: HashMap::new(),
        }
    }

    fn config(workers: Vec<WorkerConfig>, tasks: Vec<TaskConfig>) -> Config {
        Config {
            workers,
            tasks,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_empty_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_valid_diamond_dependency() {
        let cfg = config(
            vec![worker("w", "echo")],
            vec![
                task("a", vec![]),
                task("b", vec!["a"]),
                task("c", vec!["a"]),
                task("d", vec!["b", "c"]),
            ],
        );
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_dependency_order_puts_dependencies_first() {
        let cfg = config(
            vec![worker("w", "echo")],
            vec![
                task("report", vec!["b", "c"]),
                task("b", vec!["a"]),
                task("c", vec![]),
                task("a", vec![]),
            ],
        );
        assert!(validate_config(&cfg).is_ok());
        let order: Vec<&str> = dependency_order(&cfg).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b", "report"]);
    }

    #[test]
    fn test_dependency_order_keeps_declared_order_and_cycles() {
        let ordered = config(vec![], vec![task("a", vec![]), task("b", vec!["a"]), task("c", vec![])]);
        let order: Vec<&str> = dependency_order(&ordered).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);

        let cyclic = config(vec![], vec![task("x", vec!["y"]), task("y", vec!["x"]), task("z", vec![])]);
        let order: Vec<&str> = dependency_order(&cyclic).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_duplicate_ids() {
        let cfg = config(
            vec![worker("w", "echo"), worker("w", "echo")],
            vec![task("a", vec![]), task("a", vec![])],
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ValidationError::DuplicateWorkerId { worker_id: "w".into() }));
        assert!(errors.contains(&ValidationError::DuplicateTaskId { task_id: "a".into() }));
    }

    #[test]
    fn test_unknown_kind_and_assignee() {
        let mut assigned = task("a", vec![]);
        assigned.assigned_to = Some("ghost".to_string());
        let cfg = config(vec![worker("w", "oracle")], vec![assigned]);

        let errors = validate_config(&cfg).unwrap_err();
        assert!(matches!(errors[0], ValidationError::UnknownWorkerKind { .. }));
        assert!(matches!(errors[1], ValidationError::UnknownAssignee { .. }));
    }

    #[test]
    fn test_unresolved_dependency_skips_cycle_check() {
        let cfg = config(vec![], vec![task("a", vec!["b", "nonexistent"]), task("b", vec!["a"])]);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::UnresolvedDependency { .. }));
    }

    #[test]
    fn test_self_dependency_cycle() {
        let cfg = config(vec![], vec![task("a", vec!["a"])]);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::CyclicDependency {
                cycle: vec!["a".into(), "a".into()]
            }]
        );
    }

    #[test]
    fn test_complex_cycle_path() {
        let cfg = config(
            vec![],
            vec![
                task("a", vec![]),
                task("b", vec!["a", "d"]),
                task("c", vec!["b"]),
                task("d", vec!["c"]),
            ],
        );
        let errors = validate_config(&cfg).unwrap_err();
        match &errors[0] {
            ValidationError::CyclicDependency { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert_eq!(cycle.len(), 4);
            }
            other => panic!("Expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_capacity_shared_resource() {
        let mut cfg = Config::default();
        cfg.resources.push(ResourceConfig {
            name: "pool".into(),
            resource_type: "gpu".into(),
            access_mode: AccessMode::Shared,
            capacity: 0,
            owner: None,
            data: serde_json::Value::Null,
            metadata: Default::default(),
        });
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ZeroCapacity { resource_name: "pool".into() }]);
    }
}
