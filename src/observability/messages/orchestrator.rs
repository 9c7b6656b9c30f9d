// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for orchestrator lifecycle and dispatch events.
//!
//! This module contains message types for logging events related to:
//! * Worker registration and removal
//! * Task dispatch, routing and completion
//! * Dependency gating
//! * Workflow combinators (sequential, parallel, conditional, hub-and-spoke, delegation)

use crate::observability::messages::StructuredLog;
use crate::types::{AgentStatus, InvalidTransition};
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Worker registered with the orchestrator.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_conclave::observability::messages::orchestrator::WorkerRegistered;
///
/// let capabilities = vec!["analysis".to_string()];
/// let msg = WorkerRegistered {
///     worker_id: "analyst",
///     capabilities: &capabilities,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct WorkerRegistered<'a> {
    pub worker_id: &'a str,
    pub capabilities: &'a [String],
}

impl Display for WorkerRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered worker '{}' with capabilities [{}]",
            self.worker_id,
            self.capabilities.join(", ")
        )
    }
}

impl StructuredLog for WorkerRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            worker_id = self.worker_id,
            capabilities = ?self.capabilities,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_registered",
            span_name = name,
            worker_id = self.worker_id,
        )
    }
}

/// Worker removed from the orchestrator.
pub struct WorkerUnregistered<'a> {
    pub worker_id: &'a str,
}

impl Display for WorkerUnregistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unregistered worker '{}'", self.worker_id)
    }
}

impl StructuredLog for WorkerUnregistered<'_> {
    fn log(&self) {
        tracing::info!(worker_id = self.worker_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_unregistered",
            span_name = name,
            worker_id = self.worker_id,
        )
    }
}

/// Task routed to a worker and about to execute.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TaskDispatched<'a> {
    pub task_id: &'a str,
    pub task_type: &'a str,
    pub worker_id: &'a str,
}

impl Display for TaskDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatching task '{}' ({}) to worker '{}'",
            self.task_id, self.task_type, self.worker_id
        )
    }
}

impl StructuredLog for TaskDispatched<'_> {
    fn log(&self) {
        tracing::info!(
            task_id = self.task_id,
            task_type = self.task_type,
            worker_id = self.worker_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "task_execution",
            span_name = name,
            task_id = self.task_id,
            task_type = self.task_type,
            worker_id = self.worker_id,
        )
    }
}

/// Task result stored.
pub struct TaskFinished<'a> {
    pub task_id: &'a str,
    pub worker_id: &'a str,
    pub status: AgentStatus,
    pub duration: std::time::Duration,
}

impl Display for TaskFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' finished on worker '{}' with status {} in {:?}",
            self.task_id, self.worker_id, self.status, self.duration
        )
    }
}

impl StructuredLog for TaskFinished<'_> {
    fn log(&self) {
        if self.status == AgentStatus::Failed {
            tracing::warn!(
                task_id = self.task_id,
                worker_id = self.worker_id,
                status = %self.status,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        } else {
            tracing::info!(
                task_id = self.task_id,
                worker_id = self.worker_id,
                status = %self.status,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "task_finished",
            span_name = name,
            task_id = self.task_id,
            worker_id = self.worker_id,
            status = %self.status,
        )
    }
}

/// No registered worker matched the task type.
///
/// # Log Level
/// `warn!` - The caller receives `NoSuitableAgent`
pub struct RoutingFailed<'a> {
    pub task_id: &'a str,
    pub task_type: &'a str,
    pub policy: &'a str,
}

impl Display for RoutingFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No worker matches task '{}' of type '{}' under {} routing",
            self.task_id, self.task_type, self.policy
        )
    }
}

impl StructuredLog for RoutingFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            task_id = self.task_id,
            task_type = self.task_type,
            policy = self.policy,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "routing_failed",
            span_name = name,
            task_id = self.task_id,
            task_type = self.task_type,
        )
    }
}

/// Task is blocked until its dependencies complete.
pub struct DependencyWaitStarted<'a> {
    pub task_id: &'a str,
    pub pending: &'a [String],
}

impl Display for DependencyWaitStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' waiting on dependencies [{}]",
            self.task_id,
            self.pending.join(", ")
        )
    }
}

impl StructuredLog for DependencyWaitStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            task_id = self.task_id,
            pending = ?self.pending,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "dependency_wait",
            span_name = name,
            task_id = self.task_id,
        )
    }
}

/// Dependency wait budget exhausted.
///
/// # Log Level
/// `warn!` - The caller receives `DependencyTimeout`
pub struct DependencyWaitTimedOut<'a> {
    pub task_id: &'a str,
    pub pending: &'a [String],
    pub waited: std::time::Duration,
}

impl Display for DependencyWaitTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' gave up after {:?}; still pending: [{}]",
            self.task_id,
            self.waited,
            self.pending.join(", ")
        )
    }
}

impl StructuredLog for DependencyWaitTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(
            task_id = self.task_id,
            pending = ?self.pending,
            waited_ms = self.waited.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "dependency_timeout",
            span_name = name,
            task_id = self.task_id,
        )
    }
}

/// A result named delegated task ids; they are recorded, not executed.
pub struct DelegationsNotDispatched<'a> {
    pub task_id: &'a str,
    pub delegated: &'a [String],
}

impl Display for DelegationsNotDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' produced {} delegated task id(s) which are not auto-executed: [{}]",
            self.task_id,
            self.delegated.len(),
            self.delegated.join(", ")
        )
    }
}

impl StructuredLog for DelegationsNotDispatched<'_> {
    fn log(&self) {
        tracing::info!(
            task_id = self.task_id,
            delegated = ?self.delegated,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "delegations_recorded",
            span_name = name,
            task_id = self.task_id,
        )
    }
}

/// A status event did not fit the worker's current status.
///
/// # Log Level
/// `warn!` - Status is left unchanged
pub struct InvalidStatusTransition<'a> {
    pub worker_id: &'a str,
    pub error: &'a InvalidTransition,
}

impl Display for InvalidStatusTransition<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker '{}': {}", self.worker_id, self.error)
    }
}

impl StructuredLog for InvalidStatusTransition<'_> {
    fn log(&self) {
        tracing::warn!(
            worker_id = self.worker_id,
            from = %self.error.from,
            event = ?self.error.event,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "invalid_status_transition",
            span_name = name,
            worker_id = self.worker_id,
        )
    }
}

/// Workflow combinator started.
///
/// # Example
/// ```
/// use the_conclave::observability::messages::orchestrator::WorkflowStarted;
///
/// let msg = WorkflowStarted {
///     workflow: "sequential",
///     task_count: 3,
/// };
///
/// assert_eq!(msg.to_string(), "Starting sequential workflow with 3 task(s)");
/// ```
pub struct WorkflowStarted<'a> {
    pub workflow: &'a str,
    pub task_count: usize,
}

impl Display for WorkflowStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} workflow with {} task(s)",
            self.workflow, self.task_count
        )
    }
}

impl StructuredLog for WorkflowStarted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            task_count = self.task_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "workflow",
            span_name = name,
            workflow = self.workflow,
            task_count = self.task_count,
        )
    }
}

/// Workflow combinator finished.
pub struct WorkflowCompleted<'a> {
    pub workflow: &'a str,
    pub succeeded: usize,
    pub failed: usize,
    pub duration: std::time::Duration,
}

impl Display for WorkflowCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} workflow finished: {} succeeded, {} failed in {:?}",
            self.workflow, self.succeeded, self.failed, self.duration
        )
    }
}

impl StructuredLog for WorkflowCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            succeeded = self.succeeded,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "workflow_completed",
            span_name = name,
            workflow = self.workflow,
        )
    }
}
