// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors found while validating a runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A circular dependency was detected between configured tasks
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },
    /// A task references a dependency that is not configured
    UnresolvedDependency {
        task_id: String,
        missing_dependency: String,
    },
    DuplicateTaskId {
        task_id: String,
    },
    DuplicateWorkerId {
        worker_id: String,
    },
    /// A task is assigned to a worker that is not configured
    UnknownAssignee {
        task_id: String,
        worker_id: String,
    },
    UnknownWorkerKind {
        worker_id: String,
        kind: String,
    },
    ZeroCapacity {
        resource_name: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedDependency {
                task_id,
                missing_dependency,
            } => {
                write!(
                    f,
                    "Task '{}' depends on '{}' which does not exist",
                    task_id, missing_dependency
                )
            }
            ValidationError::DuplicateTaskId { task_id } => {
                write!(f, "Duplicate task ID: '{}'", task_id)
            }
            ValidationError::DuplicateWorkerId { worker_id } => {
                write!(f, "Duplicate worker ID: '{}'", worker_id)
            }
            ValidationError::UnknownAssignee { task_id, worker_id } => {
                write!(
                    f,
                    "Task '{}' is assigned to '{}' which is not a configured worker",
                    task_id, worker_id
                )
            }
            ValidationError::UnknownWorkerKind { worker_id, kind } => {
                write!(f, "Worker '{}' has unknown kind '{}'", worker_id, kind)
            }
            ValidationError::ZeroCapacity { resource_name } => {
                write!(f, "Shared resource '{}' has capacity 0", resource_name)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
