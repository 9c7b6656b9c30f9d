// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for resource arbitration events.

use crate::environment::AccessMode;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Resource created in the environment.
pub struct ResourceCreated<'a> {
    pub resource_id: &'a str,
    pub name: &'a str,
    pub access_mode: AccessMode,
    pub capacity: usize,
}

impl Display for ResourceCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Created {} resource '{}' ({}) with capacity {}",
            self.access_mode, self.name, self.resource_id, self.capacity
        )
    }
}

impl StructuredLog for ResourceCreated<'_> {
    fn log(&self) {
        tracing::info!(
            resource_id = self.resource_id,
            name = self.name,
            access_mode = %self.access_mode,
            capacity = self.capacity,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "resource_created",
            span_name = name,
            resource_id = self.resource_id,
        )
    }
}

/// Access granted to a requester.
///
/// # Example
/// ```
/// use the_conclave::environment::AccessMode;
/// use the_conclave::observability::messages::resource::ResourceGranted;
///
/// let msg = ResourceGranted {
///     resource_id: "r1",
///     requester: "analyst",
///     access_mode: AccessMode::Shared,
///     users: 2,
///     capacity: 2,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ResourceGranted<'a> {
    pub resource_id: &'a str,
    pub requester: &'a str,
    pub access_mode: AccessMode,
    pub users: usize,
    pub capacity: usize,
}

impl Display for ResourceGranted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Granted {} access on '{}' to '{}' ({}/{} users)",
            self.access_mode, self.resource_id, self.requester, self.users, self.capacity
        )
    }
}

impl StructuredLog for ResourceGranted<'_> {
    fn log(&self) {
        tracing::debug!(
            resource_id = self.resource_id,
            requester = self.requester,
            access_mode = %self.access_mode,
            users = self.users,
            capacity = self.capacity,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "resource_granted",
            span_name = name,
            resource_id = self.resource_id,
            requester = self.requester,
        )
    }
}

/// Requester has to wait for capacity or the lock.
pub struct ResourceContended<'a> {
    pub resource_id: &'a str,
    pub requester: &'a str,
}

impl Display for ResourceContended<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Agent '{}' waiting for resource '{}'",
            self.requester, self.resource_id
        )
    }
}

impl StructuredLog for ResourceContended<'_> {
    fn log(&self) {
        tracing::debug!(
            resource_id = self.resource_id,
            requester = self.requester,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "resource_contended",
            span_name = name,
            resource_id = self.resource_id,
            requester = self.requester,
        )
    }
}

/// Requester gave up.
pub struct ResourceTimedOut<'a> {
    pub resource_id: &'a str,
    pub requester: &'a str,
    pub timeout: std::time::Duration,
}

impl Display for ResourceTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Agent '{}' timed out after {:?} waiting for resource '{}'",
            self.requester, self.timeout, self.resource_id
        )
    }
}

impl StructuredLog for ResourceTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(
            resource_id = self.resource_id,
            requester = self.requester,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "resource_timeout",
            span_name = name,
            resource_id = self.resource_id,
            requester = self.requester,
        )
    }
}

/// Access released by a user. `forced` marks releases made on unregistration.
pub struct ResourceReleased<'a> {
    pub resource_id: &'a str,
    pub agent_id: &'a str,
    pub forced: bool,
}

impl Display for ResourceReleased<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.forced {
            write!(
                f,
                "Force-released resource '{}' held by unregistered agent '{}'",
                self.resource_id, self.agent_id
            )
        } else {
            write!(f, "Agent '{}' released resource '{}'", self.agent_id, self.resource_id)
        }
    }
}

impl StructuredLog for ResourceReleased<'_> {
    fn log(&self) {
        if self.forced {
            tracing::warn!(
                resource_id = self.resource_id,
                agent_id = self.agent_id,
                "{}", self
            );
        } else {
            tracing::debug!(
                resource_id = self.resource_id,
                agent_id = self.agent_id,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "resource_released",
            span_name = name,
            resource_id = self.resource_id,
            agent_id = self.agent_id,
        )
    }
}

/// Release rejected because the caller does not hold the exclusive lock.
pub struct ReleaseRejected<'a> {
    pub resource_id: &'a str,
    pub requester: &'a str,
    pub holder: Option<&'a str>,
}

impl Display for ReleaseRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected release of '{}' by '{}'; holder is {}",
            self.resource_id,
            self.requester,
            self.holder.unwrap_or("nobody")
        )
    }
}

impl StructuredLog for ReleaseRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            resource_id = self.resource_id,
            requester = self.requester,
            holder = self.holder,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "release_rejected",
            span_name = name,
            resource_id = self.resource_id,
            requester = self.requester,
        )
    }
}
