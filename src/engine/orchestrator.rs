// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinError;
use tokio::time::{timeout_at, Instant};
use tracing::Instrument;

use super::mailbox::{Mailbox, MailboxEntry};
use super::registry::WorkerRegistry;
use super::RoutingPolicy;
use crate::config::consts::DEFAULT_DEPENDENCY_TIMEOUT;
use crate::environment::Environment;
use crate::errors::{FailurePolicy, OrchestrationError, WorkerError};
use crate::observability::messages::orchestrator::*;
use crate::observability::messages::worker::*;
use crate::observability::messages::StructuredLog;
use crate::traits::Worker;
use crate::types::{AgentStatus, StatusEvent, Task, TaskResult};

/// Tunables for an [`Orchestrator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorSettings {
    /// Budget for a task waiting on its dependencies.
    pub dependency_timeout: Duration,
    pub routing: RoutingPolicy,
    pub parallel_failures: FailurePolicy,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            dependency_timeout: DEFAULT_DEPENDENCY_TIMEOUT,
            routing: RoutingPolicy::default(),
            parallel_failures: FailurePolicy::default(),
        }
    }
}

/// Point-in-time view of one registered worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerSnapshot {
    pub status: AgentStatus,
    pub capabilities: Vec<String>,
    pub in_flight: usize,
    pub pending_messages: usize,
}

/// Aggregate orchestrator status report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestratorStatus {
    pub total_workers: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub workers: BTreeMap<String, WorkerSnapshot>,
}

/// Central task dispatcher.
///
/// The orchestrator owns the worker registry, the task result store and the inter-worker
/// mailbox. It routes each task to a worker, gates it on its dependencies, runs it and
/// stores the result. The workflow combinators in [`super::workflows`] are built on
/// [`Orchestrator::execute_task`].
///
/// ## Dependency gating
///
/// Every stored result bumps a `watch` generation counter. A task with dependencies
/// subscribes before checking the store, so a result stored between the check and the wait
/// still wakes it. The whole wait is bounded by a single deadline of
/// [`OrchestratorSettings::dependency_timeout`].
///
/// ## Worker failures
///
/// Workers run inside `tokio::spawn`. A panic surfaces as a `JoinError` and is converted to a
/// `failed` [`TaskResult`]; only orchestration problems (routing, unknown assignee, dependency
/// timeout) are returned as errors.
///
/// ## Concurrency
///
/// All methods take `&self`. Share an orchestrator by `Arc` and call it from as many tasks as
/// needed; the registry, result store and mailbox each sit behind their own async lock.
///
/// Once a worker has been dispatched, its status bookkeeping and the stored result are
/// finished by the spawned task. Dropping the caller's future (for example under
/// `tokio::time::timeout`) does not strand the worker in `working` or `thinking`.
pub struct Orchestrator {
    settings: OrchestratorSettings,
    shared: Arc<Shared>,
    mailbox: Mailbox,
    environment: Option<Arc<Environment>>,
}

/// State reachable from spawned worker tasks.
struct Shared {
    registry: RwLock<WorkerRegistry>,
    results: RwLock<HashMap<String, TaskResult>>,
    results_generation: watch::Sender<u64>,
}

impl Shared {
    async fn store_result(&self, result: TaskResult) {
        self.results.write().await.insert(result.task_id.clone(), result);
        self.results_generation.send_modify(|generation| *generation += 1);
    }
}

/// One task's claim on a worker's `waiting` count.
///
/// Released explicitly with [`WaitClaim::release`]; if the gated caller is dropped first, the
/// claim is released from a background task instead.
struct WaitClaim {
    shared: Arc<Shared>,
    worker_id: Option<String>,
}

impl WaitClaim {
    async fn release(mut self) {
        let mut registry = self.shared.registry.write().await;
        if let Some(worker_id) = self.worker_id.take() {
            registry.end_wait(&worker_id);
        }
    }
}

impl Drop for WaitClaim {
    fn drop(&mut self) {
        let Some(worker_id) = self.worker_id.take() else {
            return;
        };
        let shared = Arc::clone(&self.shared);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                shared.registry.write().await.end_wait(&worker_id);
            });
        }
    }
}

impl Orchestrator {
    pub fn new(settings: OrchestratorSettings) -> Self {
        let (results_generation, _) = watch::channel(0);
        Self {
            settings,
            shared: Arc::new(Shared {
                registry: RwLock::new(WorkerRegistry::default()),
                results: RwLock::new(HashMap::new()),
                results_generation,
            }),
            mailbox: Mailbox::new(),
            environment: None,
        }
    }

    /// Attach a resource environment. Unregistering a worker then releases its locks.
    pub fn with_environment(mut self, environment: Arc<Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn environment(&self) -> Option<&Arc<Environment>> {
        self.environment.as_ref()
    }

    pub async fn register_worker(&self, worker: Arc<dyn Worker>) -> Result<(), OrchestrationError> {
        let capabilities: Vec<String> = worker.capabilities().iter().cloned().collect();
        let worker_id = worker.id().to_string();
        self.shared.registry.write().await.insert(worker)?;
        WorkerRegistered {
            worker_id: &worker_id,
            capabilities: &capabilities,
        }
        .log();
        Ok(())
    }

    /// Remove a worker and force-release any resources it holds in the attached environment.
    pub async fn unregister_worker(&self, worker_id: &str) -> Result<(), OrchestrationError> {
        self.shared.registry
            .write()
            .await
            .remove(worker_id)
            .ok_or_else(|| OrchestrationError::AgentNotFound(worker_id.to_string()))?;
        if let Some(environment) = &self.environment {
            environment.unregister_agent(worker_id).await;
        }
        WorkerUnregistered { worker_id }.log();
        Ok(())
    }

    pub async fn is_registered(&self, worker_id: &str) -> bool {
        self.shared.registry.read().await.contains(worker_id)
    }

    pub async fn worker_status(&self, worker_id: &str) -> Option<AgentStatus> {
        self.shared.registry.read().await.get(worker_id).map(|entry| entry.status)
    }

    /// Return a resting or waiting worker to `idle`.
    pub async fn reset_worker_status(&self, worker_id: &str) -> Result<AgentStatus, OrchestrationError> {
        let mut registry = self.shared.registry.write().await;
        if !registry.contains(worker_id) {
            return Err(OrchestrationError::AgentNotFound(worker_id.to_string()));
        }
        registry
            .transition(worker_id, StatusEvent::Reset)
            .map_err(|source| OrchestrationError::StatusTransition {
                worker_id: worker_id.to_string(),
                source,
            })
    }

    /// Execute one task: wait for its dependencies, resolve a worker, run it and store the result.
    ///
    /// Resolution uses `assigned_to` when present (an unknown id is `AgentNotFound`); otherwise
    /// capability routing under the configured [`RoutingPolicy`].
    pub async fn execute_task(&self, task: Task) -> Result<TaskResult, OrchestrationError> {
        let started = Instant::now();
        if !task.dependencies.is_empty() {
            self.wait_for_dependencies(&task).await?;
        }

        let worker = self.resolve_worker(&task).await?;
        let worker_id = worker.id().to_string();
        let task_id = task.id.clone();

        let dispatched = TaskDispatched {
            task_id: &task_id,
            task_type: &task.task_type,
            worker_id: &worker_id,
        };
        let span = dispatched.span("execute_task");
        dispatched.log();

        self.shared.registry.write().await.begin_work(&worker_id);
        let shared = Arc::clone(&self.shared);
        let dispatch = tokio::spawn(Self::dispatch(shared, worker, task).instrument(span));
        let result = match dispatch.await {
            Ok(result) => result,
            Err(join_error) => {
                let error = WorkerError::ExecutionFailure(panic_message(join_error, "dispatch"));
                TaskResult::failed(task_id.clone(), worker_id.clone(), error.to_string())
            }
        };

        TaskFinished {
            task_id: &task_id,
            worker_id: &worker_id,
            status: result.status,
            duration: started.elapsed(),
        }
        .log();
        Ok(result)
    }

    pub async fn get_result(&self, task_id: &str) -> Option<TaskResult> {
        self.shared.results.read().await.get(task_id).cloned()
    }

    /// Ask a worker for free-form reasoning, driving it through `thinking`.
    pub async fn consult(&self, worker_id: &str, prompt: &str) -> Result<String, OrchestrationError> {
        let worker = {
            let mut registry = self.shared.registry.write().await;
            let worker = registry
                .get(worker_id)
                .map(|entry| Arc::clone(&entry.worker))
                .ok_or_else(|| OrchestrationError::AgentNotFound(worker_id.to_string()))?;
            registry
                .transition(worker_id, StatusEvent::BeginThinking)
                .map_err(|source| OrchestrationError::StatusTransition {
                    worker_id: worker_id.to_string(),
                    source,
                })?;
            worker
        };

        let shared = Arc::clone(&self.shared);
        let id = worker_id.to_string();
        let prompt = prompt.to_string();
        let consultation = tokio::spawn(async move {
            let started = Instant::now();
            let answer = match tokio::spawn(async move { worker.reason(&prompt).await }).await {
                Ok(answer) => answer.map_err(|e| e.to_string()),
                Err(join_error) => {
                    let message = panic_message(join_error, "reasoning");
                    ReasoningPanicked {
                        worker_id: &id,
                        message: &message,
                    }
                    .log();
                    Err(WorkerError::ExecutionFailure(message).to_string())
                }
            };
            ReasoningCompleted {
                worker_id: &id,
                succeeded: answer.is_ok(),
                duration: started.elapsed(),
            }
            .log();

            let event = if answer.is_ok() { StatusEvent::FinishThinking } else { StatusEvent::Fail };
            if let Err(error) = shared.registry.write().await.transition(&id, event) {
                InvalidStatusTransition { worker_id: &id, error: &error }.log();
            }
            answer
        });

        let answer = consultation
            .await
            .unwrap_or_else(|join_error| Err(panic_message(join_error, "reasoning")));
        answer.map_err(|message| OrchestrationError::ReasoningFailed(worker_id.to_string(), message))
    }

    pub async fn send_message(&self, from: &str, to: &str, message: Value) {
        self.mailbox.send(from, to, message).await;
    }

    /// All messages delivered to `worker_id`, oldest first. Reading does not consume them.
    pub async fn get_messages(&self, worker_id: &str) -> Vec<MailboxEntry> {
        self.mailbox.messages(worker_id).await
    }

    pub async fn status(&self) -> OrchestratorStatus {
        let (total_tasks, completed_tasks, failed_tasks) = {
            let results = self.shared.results.read().await;
            let completed = results.values().filter(|r| r.is_completed()).count();
            let failed = results.values().filter(|r| r.is_failed()).count();
            (results.len(), completed, failed)
        };

        let registry = self.shared.registry.read().await;
        let mut workers = BTreeMap::new();
        for (id, entry) in registry.iter() {
            workers.insert(
                id.to_string(),
                WorkerSnapshot {
                    status: entry.status,
                    capabilities: entry.worker.capabilities().iter().cloned().collect(),
                    in_flight: entry.in_flight,
                    pending_messages: self.mailbox.count(id).await,
                },
            );
        }

        OrchestratorStatus {
            total_workers: registry.len(),
            total_tasks,
            completed_tasks,
            failed_tasks,
            workers,
        }
    }

    async fn resolve_worker(&self, task: &Task) -> Result<Arc<dyn Worker>, OrchestrationError> {
        let registry = self.shared.registry.read().await;
        if let Some(worker_id) = &task.assigned_to {
            return registry
                .get(worker_id)
                .map(|entry| Arc::clone(&entry.worker))
                .ok_or_else(|| OrchestrationError::AgentNotFound(worker_id.clone()));
        }

        registry.route(self.settings.routing, &task.task_type).ok_or_else(|| {
            RoutingFailed {
                task_id: &task.id,
                task_type: &task.task_type,
                policy: self.settings.routing.name(),
            }
            .log();
            OrchestrationError::NoSuitableAgent {
                task_id: task.id.clone(),
                task_type: task.task_type.clone(),
            }
        })
    }

    async fn pending_dependencies(&self, dependencies: &[String]) -> Vec<String> {
        let results = self.shared.results.read().await;
        dependencies
            .iter()
            .filter(|id| !results.get(id.as_str()).is_some_and(TaskResult::is_completed))
            .cloned()
            .collect()
    }

    async fn wait_for_dependencies(&self, task: &Task) -> Result<(), OrchestrationError> {
        let started = Instant::now();
        let deadline = started + self.settings.dependency_timeout;
        let mut generation = self.shared.results_generation.subscribe();
        let mut claim: Option<WaitClaim> = None;

        loop {
            let pending = self.pending_dependencies(&task.dependencies).await;
            if pending.is_empty() {
                if let Some(claim) = claim {
                    claim.release().await;
                }
                return Ok(());
            }

            if claim.is_none() {
                DependencyWaitStarted {
                    task_id: &task.id,
                    pending: &pending,
                }
                .log();
                let mut assigned = None;
                if let Some(worker_id) = &task.assigned_to {
                    if self.shared.registry.write().await.begin_wait(worker_id) {
                        assigned = Some(worker_id.clone());
                    }
                }
                claim = Some(WaitClaim {
                    shared: Arc::clone(&self.shared),
                    worker_id: assigned,
                });
            }

            // A closed channel cannot happen while `self` is alive; treat it like a timeout.
            if let Ok(Ok(())) = timeout_at(deadline, generation.changed()).await {
                continue;
            }

            let waited = started.elapsed();
            DependencyWaitTimedOut {
                task_id: &task.id,
                pending: &pending,
                waited,
            }
            .log();
            if let Some(claim) = claim {
                claim.release().await;
            }
            return Err(OrchestrationError::DependencyTimeout {
                task_id: task.id.clone(),
                pending,
                waited,
            });
        }
    }

    /// Run a dispatched task to completion and record it. Spawned, so it finishes even if the
    /// caller of [`Self::execute_task`] goes away.
    async fn dispatch(shared: Arc<Shared>, worker: Arc<dyn Worker>, task: Task) -> TaskResult {
        let worker_id = worker.id().to_string();
        let task_id = task.id.clone();
        let result = Self::invoke(worker, task).await;
        shared
            .registry
            .write()
            .await
            .finish_work(&worker_id, !result.is_failed());

        if !result.delegated_tasks.is_empty() {
            DelegationsNotDispatched {
                task_id: &task_id,
                delegated: &result.delegated_tasks,
            }
            .log();
        }

        shared.store_result(result.clone()).await;
        result
    }

    /// Run the worker in its own task so a panic becomes a `failed` result.
    async fn invoke(worker: Arc<dyn Worker>, task: Task) -> TaskResult {
        let task_id = task.id.clone();
        let worker_id = worker.id().to_string();
        WorkerExecutionStarted {
            worker_id: &worker_id,
            task_id: &task_id,
            input_keys: task.input.len(),
        }
        .log();

        let started = Instant::now();
        let handle = tokio::spawn(async move { worker.execute(task).await });

        match handle.await {
            Ok(mut result) => {
                result.task_id = task_id;
                result.worker_id = worker_id;
                if result.is_failed() {
                    let error = WorkerError::ExecutionFailure(
                        result.error_message().unwrap_or("unspecified failure").to_string(),
                    );
                    WorkerExecutionFailed {
                        worker_id: &result.worker_id,
                        task_id: &result.task_id,
                        error: &error,
                    }
                    .log();
                } else {
                    WorkerExecutionCompleted {
                        worker_id: &result.worker_id,
                        task_id: &result.task_id,
                        output_keys: result.output.len(),
                        duration: started.elapsed(),
                    }
                    .log();
                }
                result
            }
            Err(join_error) => {
                let message = panic_message(join_error, "worker");
                WorkerPanicked {
                    worker_id: &worker_id,
                    task_id: &task_id,
                    message: &message,
                }
                .log();
                let error = WorkerError::ExecutionFailure(message);
                TaskResult::failed(task_id, worker_id, error.to_string())
            }
        }
    }
}

/// The panic payload of a failed spawned task, or a note that it was cancelled.
fn panic_message(join_error: JoinError, what: &str) -> String {
    if !join_error.is_panic() {
        return format!("{what} task was cancelled");
    }
    let payload = join_error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| format!("{what} panicked"))
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(OrchestratorSettings::default())
    }
}
