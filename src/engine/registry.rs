// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::RoutingPolicy;
use crate::errors::OrchestrationError;
use crate::observability::messages::orchestrator::InvalidStatusTransition;
use crate::observability::messages::StructuredLog;
use crate::traits::Worker;
use crate::types::{AgentStatus, InvalidTransition, StatusEvent};

/// Registry bookkeeping for a single worker.
pub(crate) struct WorkerEntry {
    pub worker: Arc<dyn Worker>,
    pub status: AgentStatus,
    /// Tasks currently executing on this worker.
    pub in_flight: usize,
    /// Tasks assigned to this worker that are gated on dependencies.
    pub waiting: usize,
}

/// Workers in registration order, keyed by id.
///
/// Status changes go through [`AgentStatus::apply`]. Concurrent tasks on one worker are
/// counted so the worker stays `Working` until the last of them finishes, and gated tasks
/// are counted so it stays `Waiting` until the last wait ends.
#[derive(Default)]
pub(crate) struct WorkerRegistry {
    order: Vec<String>,
    entries: HashMap<String, WorkerEntry>,
}

impl WorkerRegistry {
    pub fn insert(&mut self, worker: Arc<dyn Worker>) -> Result<(), OrchestrationError> {
        let id = worker.id().to_string();
        if self.entries.contains_key(&id) {
            return Err(OrchestrationError::DuplicateAgent(id));
        }
        self.order.push(id.clone());
        self.entries.insert(
            id,
            WorkerEntry {
                worker,
                status: AgentStatus::Idle,
                in_flight: 0,
                waiting: 0,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, worker_id: &str) -> Option<WorkerEntry> {
        let entry = self.entries.remove(worker_id)?;
        self.order.retain(|id| id != worker_id);
        Some(entry)
    }

    pub fn get(&self, worker_id: &str) -> Option<&WorkerEntry> {
        self.entries.get(worker_id)
    }

    pub fn contains(&self, worker_id: &str) -> bool {
        self.entries.contains_key(worker_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WorkerEntry)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| (id.as_str(), entry)))
    }

    pub fn route(&self, policy: RoutingPolicy, task_type: &str) -> Option<Arc<dyn Worker>> {
        let selected = policy.select(
            task_type,
            self.iter().map(|(id, entry)| (id, entry.worker.capabilities())),
        )?;
        self.entries.get(selected).map(|entry| Arc::clone(&entry.worker))
    }

    /// Apply `event` to a worker's status.
    pub fn transition(&mut self, worker_id: &str, event: StatusEvent) -> Result<AgentStatus, InvalidTransition> {
        let Some(entry) = self.entries.get_mut(worker_id) else {
            // Removed mid-flight; nothing to track.
            return Ok(AgentStatus::Idle);
        };
        let next = entry.status.apply(event)?;
        entry.status = next;
        Ok(next)
    }

    /// Apply `event`, logging (and otherwise ignoring) an invalid transition.
    fn transition_or_log(&mut self, worker_id: &str, event: StatusEvent) {
        if let Err(error) = self.transition(worker_id, event) {
            InvalidStatusTransition { worker_id, error: &error }.log();
        }
    }

    pub fn begin_work(&mut self, worker_id: &str) {
        if let Some(entry) = self.entries.get_mut(worker_id) {
            entry.in_flight += 1;
        }
        self.transition_or_log(worker_id, StatusEvent::BeginWork);
    }

    pub fn finish_work(&mut self, worker_id: &str, succeeded: bool) {
        let Some(entry) = self.entries.get_mut(worker_id) else {
            return;
        };
        entry.in_flight = entry.in_flight.saturating_sub(1);
        if entry.in_flight > 0 {
            return;
        }
        let event = if succeeded { StatusEvent::Complete } else { StatusEvent::Fail };
        self.transition_or_log(worker_id, event);
    }

    /// Count a gated task assigned to `worker_id`, marking a resting worker as waiting.
    ///
    /// Returns `false` for an unknown worker; every `true` must be paired with [`Self::end_wait`].
    pub fn begin_wait(&mut self, worker_id: &str) -> bool {
        let Some(entry) = self.entries.get_mut(worker_id) else {
            return false;
        };
        entry.waiting += 1;
        if entry.in_flight == 0 && entry.status.is_resting() {
            self.transition_or_log(worker_id, StatusEvent::Wait);
        }
        true
    }

    /// End one wait started by [`Self::begin_wait`], whether it was satisfied or abandoned.
    /// The worker leaves `waiting` only when no other task is still gated on it.
    pub fn end_wait(&mut self, worker_id: &str) {
        let Some(entry) = self.entries.get_mut(worker_id) else {
            return;
        };
        entry.waiting = entry.waiting.saturating_sub(1);
        if entry.waiting == 0 && entry.status == AgentStatus::Waiting {
            self.transition_or_log(worker_id, StatusEvent::Reset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::StubWorker;

    fn registry_with(ids: &[&str]) -> WorkerRegistry {
        let mut registry = WorkerRegistry::default();
        for id in ids {
            registry.insert(Arc::new(StubWorker::new(id, ["analysis"]))).unwrap();
        }
        registry
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry_with(&["a"]);
        let err = registry.insert(Arc::new(StubWorker::new("a", ["x"]))).unwrap_err();
        assert_eq!(err, OrchestrationError::DuplicateAgent("a".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removal_keeps_registration_order() {
        let mut registry = registry_with(&["a", "b", "c"]);
        assert!(registry.remove("b").is_some());
        let ids: Vec<&str> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(registry.remove("b").is_none());
    }

    #[test]
    fn overlapping_work_completes_once() {
        let mut registry = registry_with(&["a"]);
        registry.begin_work("a");
        registry.begin_work("a");
        registry.finish_work("a", false);
        assert_eq!(registry.get("a").unwrap().status, AgentStatus::Working);
        registry.finish_work("a", true);
        assert_eq!(registry.get("a").unwrap().status, AgentStatus::Completed);
    }

    #[test]
    fn waiting_is_only_entered_from_rest() {
        let mut registry = registry_with(&["a"]);
        assert!(registry.begin_wait("a"));
        assert_eq!(registry.get("a").unwrap().status, AgentStatus::Waiting);
        registry.end_wait("a");
        assert_eq!(registry.get("a").unwrap().status, AgentStatus::Idle);

        registry.begin_work("a");
        assert!(registry.begin_wait("a"));
        assert_eq!(registry.get("a").unwrap().status, AgentStatus::Working);
        assert!(!registry.begin_wait("ghost"));
    }

    #[test]
    fn worker_keeps_waiting_until_last_gated_task_ends() {
        let mut registry = registry_with(&["a"]);
        registry.begin_wait("a");
        registry.begin_wait("a");
        assert_eq!(registry.get("a").unwrap().waiting, 2);

        registry.end_wait("a");
        assert_eq!(registry.get("a").unwrap().status, AgentStatus::Waiting);

        registry.end_wait("a");
        assert_eq!(registry.get("a").unwrap().status, AgentStatus::Idle);
        assert_eq!(registry.get("a").unwrap().waiting, 0);
    }

    #[test]
    fn invalid_transition_leaves_status_unchanged() {
        let mut registry = registry_with(&["a"]);
        let err = registry.transition("a", StatusEvent::Complete).unwrap_err();
        assert_eq!(err.from, AgentStatus::Idle);
        assert_eq!(registry.get("a").unwrap().status, AgentStatus::Idle);
    }
}
