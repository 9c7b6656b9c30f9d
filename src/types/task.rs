// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Payload};

/// A unit of work handed to the orchestrator.
///
/// Tasks are immutable after dispatch except for `assigned_to`, `delegated_by` and
/// `parent_task_id`, which delegation fills in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub description: String,
    #[serde(default)]
    pub input: Payload,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub delegated_by: Option<String>,
    #[serde(default)]
    pub parent_task_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with a generated id and an empty input.
    pub fn new(task_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            task_type: task_type.into(),
            description: description.into(),
            input: Payload::new(),
            assigned_to: None,
            priority: 0,
            dependencies: Vec::new(),
            delegated_by: None,
            parent_task_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_input(mut self, input: Payload) -> Self {
        self.input = input;
        self
    }

    /// Insert a single input entry, replacing any previous value under `key`.
    pub fn with_input_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.input.insert(key.into(), value);
        self
    }

    pub fn assigned_to(mut self, worker_id: impl Into<String>) -> Self {
        self.assigned_to = Some(worker_id.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(dependencies.into_iter().map(Into::into));
        self
    }

    pub fn with_parent(mut self, parent_task_id: impl Into<String>) -> Self {
        self.parent_task_id = Some(parent_task_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_bookkeeping_fields() {
        let task = Task::new("market_analysis", "size the market")
            .with_id("t1")
            .assigned_to("analyst")
            .depends_on(["t0"])
            .with_priority(3)
            .with_input_value("region", json!("emea"));

        assert_eq!(task.id, "t1");
        assert_eq!(task.assigned_to.as_deref(), Some("analyst"));
        assert_eq!(task.dependencies, vec!["t0".to_string()]);
        assert_eq!(task.priority, 3);
        assert_eq!(task.input["region"], json!("emea"));
        assert!(task.delegated_by.is_none());
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Task::new("x", "a");
        let b = Task::new("x", "b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn task_type_serializes_as_type() {
        let task = Task::new("risk", "assess").with_id("t9");
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["type"], json!("risk"));
        assert_eq!(value["id"], json!("t9"));
    }
}
