// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for worker execution lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Worker execution start and completion
//! * Worker failures (returned or panicked)
//! * Reasoning consultations

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Worker execution started.
///
/// # Log Level
/// `debug!` - Per-task detail
pub struct WorkerExecutionStarted<'a> {
    pub worker_id: &'a str,
    pub task_id: &'a str,
    pub input_keys: usize,
}

impl Display for WorkerExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' started task '{}': input_keys={}",
            self.worker_id, self.task_id, self.input_keys
        )
    }
}

impl StructuredLog for WorkerExecutionStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_id = self.worker_id,
            task_id = self.task_id,
            input_keys = self.input_keys,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "worker_execution",
            span_name = name,
            worker_id = self.worker_id,
            task_id = self.task_id,
        )
    }
}

/// Worker execution completed.
///
/// # Log Level
/// `debug!` - Per-task detail
///
/// # Example
/// ```
/// use the_conclave::observability::messages::worker::WorkerExecutionCompleted;
/// use std::time::Duration;
///
/// let msg = WorkerExecutionCompleted {
///     worker_id: "analyst",
///     task_id: "t1",
///     output_keys: 2,
///     duration: Duration::from_millis(10),
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct WorkerExecutionCompleted<'a> {
    pub worker_id: &'a str,
    pub task_id: &'a str,
    pub output_keys: usize,
    pub duration: std::time::Duration,
}

impl Display for WorkerExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' finished task '{}': output_keys={}, duration={:?}",
            self.worker_id, self.task_id, self.output_keys, self.duration
        )
    }
}

impl StructuredLog for WorkerExecutionCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_id = self.worker_id,
            task_id = self.task_id,
            output_keys = self.output_keys,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "worker_completed",
            span_name = name,
            worker_id = self.worker_id,
            task_id = self.task_id,
        )
    }
}

/// Worker returned a failure.
///
/// # Log Level
/// `warn!` - The failure is recorded as a `failed` result, not raised
pub struct WorkerExecutionFailed<'a> {
    pub worker_id: &'a str,
    pub task_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' failed task '{}': {}",
            self.worker_id, self.task_id, self.error
        )
    }
}

impl StructuredLog for WorkerExecutionFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            worker_id = self.worker_id,
            task_id = self.task_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "worker_failed",
            span_name = name,
            worker_id = self.worker_id,
            task_id = self.task_id,
            error = %self.error,
        )
    }
}

/// Worker panicked inside `execute`.
///
/// # Log Level
/// `error!` - Worker bug; converted into a `failed` result
pub struct WorkerPanicked<'a> {
    pub worker_id: &'a str,
    pub task_id: &'a str,
    pub message: &'a str,
}

impl Display for WorkerPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' panicked on task '{}': {}",
            self.worker_id, self.task_id, self.message
        )
    }
}

impl StructuredLog for WorkerPanicked<'_> {
    fn log(&self) {
        tracing::error!(
            worker_id = self.worker_id,
            task_id = self.task_id,
            message = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_panicked",
            span_name = name,
            worker_id = self.worker_id,
            task_id = self.task_id,
        )
    }
}

/// A worker panicked while answering a reasoning request.
pub struct ReasoningPanicked<'a> {
    pub worker_id: &'a str,
    pub message: &'a str,
}

impl Display for ReasoningPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' panicked while reasoning: {}",
            self.worker_id, self.message
        )
    }
}

impl StructuredLog for ReasoningPanicked<'_> {
    fn log(&self) {
        tracing::error!(
            worker_id = self.worker_id,
            message = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "reasoning_panicked",
            span_name = name,
            worker_id = self.worker_id,
        )
    }
}

/// Reasoning consultation finished.
pub struct ReasoningCompleted<'a> {
    pub worker_id: &'a str,
    pub succeeded: bool,
    pub duration: std::time::Duration,
}

impl Display for ReasoningCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let outcome = if self.succeeded { "answered" } else { "failed" };
        write!(
            f,
            "Worker '{}' {} reasoning request in {:?}",
            self.worker_id, outcome, self.duration
        )
    }
}

impl StructuredLog for ReasoningCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_id = self.worker_id,
            succeeded = self.succeeded,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "reasoning",
            span_name = name,
            worker_id = self.worker_id,
        )
    }
}
