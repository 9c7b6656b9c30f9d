// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;
use thiserror::Error;

/// Failures of resource arbitration and payload access.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Resource '{0}' not found")]
    ResourceNotFound(String),

    /// Capacity or lock did not free up within the requested timeout.
    #[error("Agent '{requester}' timed out after {timeout:?} waiting for resource '{resource_id}'")]
    ResourceTimeout {
        resource_id: String,
        requester: String,
        timeout: Duration,
    },

    /// An exclusive resource was released by an agent that does not hold it.
    #[error("Agent '{requester}' does not hold exclusive resource '{resource_id}' (holder: {holder:?})")]
    NotHolder {
        resource_id: String,
        requester: String,
        holder: Option<String>,
    },

    #[error("Agent '{requester}' is not a current user of resource '{resource_id}'")]
    AccessDenied { resource_id: String, requester: String },

    #[error("Resource '{resource_id}' is read-only; only its owner may update it")]
    ReadOnly { resource_id: String },

    #[error("Shared resource '{name}' needs a capacity of at least 1")]
    InvalidCapacity { name: String },
}
