// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

use crate::config::consts::DEFAULT_EVENT_LOG_CAPACITY;
use crate::types::new_id;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ResourceCreated,
    ResourceAccessed,
    ResourceReleased,
    ResourceUpdated,
    StateUpdated,
    AgentUnregistered,
    Custom(String),
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::ResourceCreated => f.write_str("resource_created"),
            EventType::ResourceAccessed => f.write_str("resource_accessed"),
            EventType::ResourceReleased => f.write_str("resource_released"),
            EventType::ResourceUpdated => f.write_str("resource_updated"),
            EventType::StateUpdated => f.write_str("state_updated"),
            EventType::AgentUnregistered => f.write_str("agent_unregistered"),
            EventType::Custom(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentEvent {
    pub id: String,
    pub event_type: EventType,
    pub source_agent: Option<String>,
    pub target_agent: Option<String>,
    pub resource_id: Option<String>,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl EnvironmentEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            id: new_id(),
            event_type,
            source_agent: None,
            target_agent: None,
            resource_id: None,
            data: Value::Null,
            timestamp: Utc::now(),
        }
    }

    pub fn from_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.source_agent = Some(agent_id.into());
        self
    }

    pub fn to_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.target_agent = Some(agent_id.into());
        self
    }

    pub fn on_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    fn involves(&self, agent_id: &str) -> bool {
        self.source_agent.as_deref() == Some(agent_id) || self.target_agent.as_deref() == Some(agent_id)
    }
}

/// Filter for [`EventLog::query`]. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    /// Matches events whose source or target is this agent.
    pub agent_id: Option<String>,
    pub event_type: Option<EventType>,
    /// Keep only the most recent `limit` matches.
    pub limit: Option<usize>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Append-only ring buffer of environment events. The oldest entry is evicted once
/// `capacity` is reached.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<EnvironmentEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, event: EnvironmentEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<&EnvironmentEvent> {
        self.events.front()
    }

    /// Matching events in chronological order.
    pub fn query(&self, query: &EventQuery) -> Vec<EnvironmentEvent> {
        let matches: Vec<&EnvironmentEvent> = self
            .events
            .iter()
            .filter(|e| query.agent_id.as_deref().map_or(true, |a| e.involves(a)))
            .filter(|e| query.event_type.as_ref().map_or(true, |t| &e.event_type == t))
            .collect();

        let skip = query
            .limit
            .map_or(0, |limit| matches.len().saturating_sub(limit));
        matches.into_iter().skip(skip).cloned().collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn caps_at_capacity_and_evicts_oldest() {
        let mut log = EventLog::new(10_000);
        for i in 0..10_001 {
            log.push(EnvironmentEvent::new(EventType::StateUpdated).with_data(json!(i)));
        }
        assert_eq!(log.len(), 10_000);
        assert_eq!(log.oldest().unwrap().data, json!(1));
    }

    #[test]
    fn default_capacity_is_ten_thousand() {
        assert_eq!(EventLog::default().capacity(), 10_000);
    }

    #[test]
    fn query_filters_by_agent_type_and_limit() {
        let mut log = EventLog::new(100);
        log.push(EnvironmentEvent::new(EventType::ResourceAccessed).from_agent("a").with_data(json!(1)));
        log.push(EnvironmentEvent::new(EventType::ResourceAccessed).from_agent("b"));
        log.push(EnvironmentEvent::new(EventType::ResourceReleased).from_agent("a"));
        log.push(EnvironmentEvent::new(EventType::ResourceAccessed).to_agent("a").with_data(json!(2)));

        let by_agent = log.query(&EventQuery::new().agent("a"));
        assert_eq!(by_agent.len(), 3);

        let accessed = log.query(&EventQuery::new().agent("a").event_type(EventType::ResourceAccessed));
        assert_eq!(accessed.len(), 2);

        let latest = log.query(&EventQuery::new().agent("a").event_type(EventType::ResourceAccessed).limit(1));
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].data, json!(2));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut log = EventLog::new(0);
        log.push(EnvironmentEvent::new(EventType::StateUpdated));
        log.push(EnvironmentEvent::new(EventType::StateUpdated));
        assert_eq!(log.len(), 1);
    }
}
