// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::time::Instant;

use super::event_log::{EnvironmentEvent, EventLog, EventQuery, EventType};
use super::resource::{AccessMode, Grant, Resource, ResourceSpec};
use crate::config::consts::{DEFAULT_EVENT_LOG_CAPACITY, DEFAULT_RESOURCE_TIMEOUT};
use crate::errors::ResourceError;
use crate::observability::messages::resource::*;
use crate::observability::messages::StructuredLog;
use crate::types::Payload;

/// One resource plus the notification its waiters park on.
struct ResourceSlot {
    state: Mutex<Resource>,
    released: Notify,
}

/// Registry of shared resources, the event log and the shared key/value store.
///
/// Construct one per run and share it by `Arc`; there is no global instance.
///
/// # Examples
///
/// ```rust
/// use the_conclave::environment::{AccessMode, Environment, ResourceSpec};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let env = Environment::new();
/// let id = env
///     .create_resource(ResourceSpec::new("ledger", "document", AccessMode::Exclusive))
///     .await?;
///
/// env.request_resource(&id, "analyst", Some(Duration::from_millis(100))).await?;
/// env.release_resource(&id, "analyst").await?;
/// # Ok(())
/// # }
/// ```
pub struct Environment {
    resources: RwLock<HashMap<String, Arc<ResourceSlot>>>,
    shared_state: RwLock<Payload>,
    events: Mutex<EventLog>,
    default_timeout: Duration,
}

/// Point-in-time usage of one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceUsage {
    pub id: String,
    pub name: String,
    pub access_mode: AccessMode,
    pub users: usize,
    pub capacity: usize,
    pub holder: Option<String>,
    pub access_count: u64,
    pub contention_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentStatus {
    pub resource_count: usize,
    pub event_count: usize,
    pub shared_state_keys: Vec<String>,
    pub resources: Vec<ResourceUsage>,
}

impl Environment {
    pub fn new() -> Self {
        Self::with_options(DEFAULT_EVENT_LOG_CAPACITY, DEFAULT_RESOURCE_TIMEOUT)
    }

    /// Create an environment with a custom event log capacity and a default request timeout
    /// used when `request_resource` is called without one.
    pub fn with_options(event_log_capacity: usize, default_timeout: Duration) -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
            shared_state: RwLock::new(Payload::new()),
            events: Mutex::new(EventLog::new(event_log_capacity)),
            default_timeout,
        }
    }

    /// Register a new resource and return its id.
    pub async fn create_resource(&self, spec: ResourceSpec) -> Result<String, ResourceError> {
        if spec.access_mode == AccessMode::Shared && spec.capacity == 0 {
            return Err(ResourceError::InvalidCapacity { name: spec.name });
        }

        let resource = Resource::from_spec(spec);
        let id = resource.id.clone();
        let owner = resource.owner.clone();

        ResourceCreated {
            resource_id: &id,
            name: &resource.name,
            access_mode: resource.access_mode,
            capacity: resource.capacity,
        }
        .log();

        let event_data = json!({
            "name": resource.name,
            "type": resource.resource_type,
            "access_mode": resource.access_mode,
            "capacity": resource.capacity,
        });

        self.resources.write().await.insert(
            id.clone(),
            Arc::new(ResourceSlot {
                state: Mutex::new(resource),
                released: Notify::new(),
            }),
        );

        self.record(
            EnvironmentEvent::new(EventType::ResourceCreated)
                .from_agent(owner)
                .on_resource(&id)
                .with_data(event_data),
        )
        .await;

        Ok(id)
    }

    /// Acquire access to a resource, waiting up to `timeout` (or the environment default)
    /// for capacity or the exclusive lock.
    ///
    /// Read-only resources are granted immediately. A requester that already holds the
    /// resource is granted again without being counted twice.
    pub async fn request_resource(
        &self,
        resource_id: &str,
        requester: &str,
        timeout: Option<Duration>,
    ) -> Result<(), ResourceError> {
        let slot = self.slot(resource_id).await?;
        let timeout = timeout.unwrap_or(self.default_timeout);
        let deadline = Instant::now() + timeout;
        let mut contended = false;

        loop {
            // Register for wake-up before inspecting state so a release in between is not lost.
            let released = slot.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            {
                let mut resource = slot.state.lock().await;
                match resource.try_grant(requester) {
                    Grant::AlreadyHeld => return Ok(()),
                    Grant::Granted => {
                        resource.access_count += 1;
                        if contended {
                            resource.contention_count += 1;
                        }
                        ResourceGranted {
                            resource_id,
                            requester,
                            access_mode: resource.access_mode,
                            users: resource.current_users.len(),
                            capacity: resource.capacity,
                        }
                        .log();
                        let event_data = json!({
                            "access_mode": resource.access_mode,
                            "users": resource.current_users.len(),
                            "waited": contended,
                        });
                        drop(resource);

                        self.record(
                            EnvironmentEvent::new(EventType::ResourceAccessed)
                                .from_agent(requester)
                                .on_resource(resource_id)
                                .with_data(event_data),
                        )
                        .await;
                        return Ok(());
                    }
                    Grant::Busy => {
                        if !contended {
                            contended = true;
                            ResourceContended { resource_id, requester }.log();
                        }
                    }
                }
            }

            if tokio::time::timeout_at(deadline, released).await.is_err() {
                ResourceTimedOut {
                    resource_id,
                    requester,
                    timeout,
                }
                .log();
                return Err(ResourceError::ResourceTimeout {
                    resource_id: resource_id.to_string(),
                    requester: requester.to_string(),
                    timeout,
                });
            }
        }
    }

    /// Give up access to a resource.
    ///
    /// Exclusive resources only accept a release from the current holder. For shared and
    /// read-only resources releasing without being a user is a no-op.
    pub async fn release_resource(&self, resource_id: &str, requester: &str) -> Result<(), ResourceError> {
        let slot = self.slot(resource_id).await?;

        let removed = {
            let mut resource = slot.state.lock().await;
            if resource.access_mode == AccessMode::Exclusive {
                if resource.holder.as_deref() != Some(requester) {
                    ReleaseRejected {
                        resource_id,
                        requester,
                        holder: resource.holder.as_deref(),
                    }
                    .log();
                    return Err(ResourceError::NotHolder {
                        resource_id: resource_id.to_string(),
                        requester: requester.to_string(),
                        holder: resource.holder.clone(),
                    });
                }
                resource.holder = None;
            }
            resource.current_users.remove(requester)
        };

        if !removed {
            return Ok(());
        }

        slot.released.notify_waiters();
        ResourceReleased {
            resource_id,
            agent_id: requester,
            forced: false,
        }
        .log();
        self.record(
            EnvironmentEvent::new(EventType::ResourceReleased)
                .from_agent(requester)
                .on_resource(resource_id),
        )
        .await;
        Ok(())
    }

    /// Read a resource's payload. Read-only resources are readable by anyone; others only
    /// by a current user.
    pub async fn get_resource_data(&self, resource_id: &str, agent_id: &str) -> Result<Value, ResourceError> {
        let slot = self.slot(resource_id).await?;
        let resource = slot.state.lock().await;
        if resource.access_mode != AccessMode::ReadOnly && !resource.is_user(agent_id) {
            return Err(ResourceError::AccessDenied {
                resource_id: resource_id.to_string(),
                requester: agent_id.to_string(),
            });
        }
        Ok(resource.data.clone())
    }

    /// Replace a resource's payload.
    ///
    /// On shared and exclusive resources the caller must be a current user. Read-only
    /// resources are stricter: only the owner may update them, whether or not it currently
    /// holds access, and a non-owner gets [`ResourceError::ReadOnly`] even while it is a
    /// current user.
    pub async fn update_resource_data(
        &self,
        resource_id: &str,
        agent_id: &str,
        data: Value,
    ) -> Result<(), ResourceError> {
        let slot = self.slot(resource_id).await?;
        {
            let mut resource = slot.state.lock().await;
            match resource.access_mode {
                AccessMode::ReadOnly if resource.owner != agent_id => {
                    return Err(ResourceError::ReadOnly {
                        resource_id: resource_id.to_string(),
                    });
                }
                AccessMode::ReadOnly => {}
                AccessMode::Shared | AccessMode::Exclusive => {
                    if !resource.is_user(agent_id) {
                        return Err(ResourceError::AccessDenied {
                            resource_id: resource_id.to_string(),
                            requester: agent_id.to_string(),
                        });
                    }
                }
            }
            resource.data = data;
        }

        self.record(
            EnvironmentEvent::new(EventType::ResourceUpdated)
                .from_agent(agent_id)
                .on_resource(resource_id),
        )
        .await;
        Ok(())
    }

    /// Snapshot of a resource.
    pub async fn get_resource(&self, resource_id: &str) -> Result<Resource, ResourceError> {
        let slot = self.slot(resource_id).await?;
        let resource = slot.state.lock().await;
        Ok(resource.clone())
    }

    /// Look up a resource id by name.
    pub async fn find_resource(&self, name: &str) -> Option<String> {
        let slots: Vec<Arc<ResourceSlot>> = self.resources.read().await.values().cloned().collect();
        for slot in slots {
            let resource = slot.state.lock().await;
            if resource.name == name {
                return Some(resource.id.clone());
            }
        }
        None
    }

    /// Remove an agent from every resource it uses, force-releasing any exclusive lock it
    /// holds, and wake waiters. Returns the ids of the resources it was removed from.
    pub async fn unregister_agent(&self, agent_id: &str) -> Vec<String> {
        let slots: Vec<(String, Arc<ResourceSlot>)> = self
            .resources
            .read()
            .await
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();

        let mut released = Vec::new();
        for (resource_id, slot) in slots {
            let (was_user, was_holder) = {
                let mut resource = slot.state.lock().await;
                let was_holder = resource.holder.as_deref() == Some(agent_id);
                if was_holder {
                    resource.holder = None;
                }
                (resource.current_users.remove(agent_id), was_holder)
            };

            if !(was_user || was_holder) {
                continue;
            }

            slot.released.notify_waiters();
            ResourceReleased {
                resource_id: &resource_id,
                agent_id,
                forced: was_holder,
            }
            .log();
            self.record(
                EnvironmentEvent::new(EventType::ResourceReleased)
                    .from_agent(agent_id)
                    .on_resource(&resource_id)
                    .with_data(json!({ "forced": was_holder })),
            )
            .await;
            released.push(resource_id);
        }

        self.record(
            EnvironmentEvent::new(EventType::AgentUnregistered)
                .from_agent(agent_id)
                .with_data(json!({ "released": released })),
        )
        .await;
        released
    }

    /// Write a shared key/value entry.
    pub async fn set_shared_state(&self, key: impl Into<String>, value: Value, agent_id: &str) {
        let key = key.into();
        self.shared_state.write().await.insert(key.clone(), value);
        self.record(
            EnvironmentEvent::new(EventType::StateUpdated)
                .from_agent(agent_id)
                .with_data(json!({ "key": key })),
        )
        .await;
    }

    pub async fn get_shared_state(&self, key: &str) -> Option<Value> {
        self.shared_state.read().await.get(key).cloned()
    }

    pub async fn shared_state(&self) -> Payload {
        self.shared_state.read().await.clone()
    }

    /// Append a caller-supplied event to the log and return its id.
    pub async fn record_event(&self, event: EnvironmentEvent) -> String {
        let id = event.id.clone();
        self.record(event).await;
        id
    }

    pub async fn get_events(&self, query: &EventQuery) -> Vec<EnvironmentEvent> {
        self.events.lock().await.query(query)
    }

    pub async fn event_count(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn status(&self) -> EnvironmentStatus {
        let slots: Vec<Arc<ResourceSlot>> = self.resources.read().await.values().cloned().collect();
        let mut resources = Vec::with_capacity(slots.len());
        for slot in slots {
            let r = slot.state.lock().await;
            resources.push(ResourceUsage {
                id: r.id.clone(),
                name: r.name.clone(),
                access_mode: r.access_mode,
                users: r.current_users.len(),
                capacity: r.capacity,
                holder: r.holder.clone(),
                access_count: r.access_count,
                contention_count: r.contention_count,
            });
        }
        resources.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let mut shared_state_keys: Vec<String> = self.shared_state.read().await.keys().cloned().collect();
        shared_state_keys.sort();

        EnvironmentStatus {
            resource_count: resources.len(),
            event_count: self.event_count().await,
            shared_state_keys,
            resources,
        }
    }

    async fn slot(&self, resource_id: &str) -> Result<Arc<ResourceSlot>, ResourceError> {
        self.resources
            .read()
            .await
            .get(resource_id)
            .cloned()
            .ok_or_else(|| ResourceError::ResourceNotFound(resource_id.to_string()))
    }

    async fn record(&self, event: EnvironmentEvent) {
        self.events.lock().await.push(event);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
