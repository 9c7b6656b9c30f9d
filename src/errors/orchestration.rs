// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Orchestration-level failures.
//!
//! These are raised to the caller synchronously. A worker's own failure never
//! appears here; it is converted into a `failed` [`TaskResult`](crate::types::TaskResult).

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::ResourceError;
use crate::types::InvalidTransition;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestrationError {
    /// A task or workflow named a worker that is not registered.
    #[error("Agent '{0}' not found")]
    AgentNotFound(String),

    /// No registered worker advertises a capability matching the task type.
    #[error("No suitable agent found for task type '{task_type}' (task '{task_id}')")]
    NoSuitableAgent { task_id: String, task_type: String },

    /// Dependencies did not all complete within the wait budget.
    #[error("Task '{task_id}' timed out after {waited:?} waiting for dependencies {pending:?}")]
    DependencyTimeout {
        task_id: String,
        pending: Vec<String>,
        waited: Duration,
    },

    /// A worker with the same id is already registered.
    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(String),

    /// The worker does not implement reasoning consultation.
    #[error("Agent '{0}' failed to reason: {1}")]
    ReasoningFailed(String, String),

    /// An explicit status request did not fit the worker's current status.
    #[error("Agent '{worker_id}': {source}")]
    StatusTransition {
        worker_id: String,
        source: InvalidTransition,
    },

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// How parallel workflows report tasks that raised instead of returning a result.
///
/// `Report` keeps every outcome, tagged success or failure, in submission order.
/// `Drop` keeps only the successes, preserving their relative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Report,
    Drop,
}
