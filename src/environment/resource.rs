// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use crate::types::{new_id, Payload};

/// How concurrent requesters may hold a resource.
///
/// * `Exclusive` - a single holder at a time, whatever the `capacity` field says
/// * `Shared` - up to `capacity` simultaneous users
/// * `ReadOnly` - always granted; `capacity` is advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    Exclusive,
    Shared,
    ReadOnly,
}

impl Display for AccessMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AccessMode::Exclusive => "exclusive",
            AccessMode::Shared => "shared",
            AccessMode::ReadOnly => "read_only",
        };
        f.write_str(name)
    }
}

/// A named, access-controlled shared object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub access_mode: AccessMode,
    pub capacity: usize,
    pub data: Value,
    pub owner: String,
    pub current_users: BTreeSet<String>,
    /// Holder of the exclusive lock. Always `None` for shared and read-only resources.
    pub holder: Option<String>,
    pub created_at: DateTime<Utc>,
    pub metadata: Payload,
    pub access_count: u64,
    /// Grants that had to wait for capacity or the lock.
    pub contention_count: u64,
}

/// Grant decision for a single request attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grant {
    Granted,
    AlreadyHeld,
    Busy,
}

impl Resource {
    pub(crate) fn from_spec(spec: ResourceSpec) -> Self {
        Self {
            id: new_id(),
            name: spec.name,
            resource_type: spec.resource_type,
            access_mode: spec.access_mode,
            capacity: spec.capacity,
            data: spec.data,
            owner: spec.owner,
            current_users: BTreeSet::new(),
            holder: None,
            created_at: Utc::now(),
            metadata: spec.metadata,
            access_count: 0,
            contention_count: 0,
        }
    }

    pub fn is_user(&self, agent_id: &str) -> bool {
        self.current_users.contains(agent_id)
    }

    /// Try to admit `requester` without waiting.
    pub(crate) fn try_grant(&mut self, requester: &str) -> Grant {
        match self.access_mode {
            AccessMode::ReadOnly => {
                if self.current_users.insert(requester.to_string()) {
                    Grant::Granted
                } else {
                    Grant::AlreadyHeld
                }
            }
            AccessMode::Shared => {
                if self.is_user(requester) {
                    Grant::AlreadyHeld
                } else if self.current_users.len() < self.capacity {
                    self.current_users.insert(requester.to_string());
                    Grant::Granted
                } else {
                    Grant::Busy
                }
            }
            AccessMode::Exclusive => match self.holder.as_deref() {
                Some(holder) if holder == requester => Grant::AlreadyHeld,
                Some(_) => Grant::Busy,
                None => {
                    self.holder = Some(requester.to_string());
                    self.current_users.insert(requester.to_string());
                    Grant::Granted
                }
            },
        }
    }
}

/// Parameters for [`Environment::create_resource`](super::Environment::create_resource).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSpec {
    pub name: String,
    pub resource_type: String,
    pub access_mode: AccessMode,
    pub capacity: usize,
    pub data: Value,
    pub owner: String,
    pub metadata: Payload,
}

impl ResourceSpec {
    pub fn new(name: impl Into<String>, resource_type: impl Into<String>, access_mode: AccessMode) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            access_mode,
            capacity: 1,
            data: Value::Null,
            owner: "system".to_string(),
            metadata: Payload::new(),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Payload) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(mode: AccessMode, capacity: usize) -> Resource {
        Resource::from_spec(ResourceSpec::new("r", "test", mode).with_capacity(capacity))
    }

    #[test]
    fn shared_admits_up_to_capacity() {
        let mut r = resource(AccessMode::Shared, 2);
        assert_eq!(r.try_grant("a"), Grant::Granted);
        assert_eq!(r.try_grant("b"), Grant::Granted);
        assert_eq!(r.try_grant("c"), Grant::Busy);
        assert_eq!(r.try_grant("a"), Grant::AlreadyHeld);
        assert_eq!(r.current_users.len(), 2);
    }

    #[test]
    fn exclusive_ignores_capacity() {
        let mut r = resource(AccessMode::Exclusive, 5);
        assert_eq!(r.try_grant("a"), Grant::Granted);
        assert_eq!(r.try_grant("b"), Grant::Busy);
        assert_eq!(r.holder.as_deref(), Some("a"));
    }

    #[test]
    fn read_only_always_admits() {
        let mut r = resource(AccessMode::ReadOnly, 1);
        assert_eq!(r.try_grant("a"), Grant::Granted);
        assert_eq!(r.try_grant("b"), Grant::Granted);
        assert!(r.holder.is_none());
    }
}
