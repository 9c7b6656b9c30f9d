// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// A worker's own failure. The orchestrator converts these into `failed` results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkerError {
    #[error("Worker execution failed: {0}")]
    ExecutionFailure(String),

    #[error("Invalid task input: {0}")]
    InvalidInput(String),

    #[error("Worker '{0}' does not support reasoning")]
    Unsupported(String),
}
