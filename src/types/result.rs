// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AgentStatus, Payload};

/// Outcome of one task execution by one worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub worker_id: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub output: Payload,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub delegated_tasks: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

impl TaskResult {
    /// A `completed` result carrying `output`.
    pub fn completed(task_id: impl Into<String>, worker_id: impl Into<String>, output: Payload) -> Self {
        Self {
            task_id: task_id.into(),
            worker_id: worker_id.into(),
            status: AgentStatus::Completed,
            output,
            confidence: 1.0,
            reasoning: String::new(),
            recommendations: Vec::new(),
            next_steps: Vec::new(),
            delegated_tasks: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    /// A `failed` result whose output is `{"error": message}`.
    pub fn failed(task_id: impl Into<String>, worker_id: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        let mut output = Payload::new();
        output.insert("error".to_string(), json!(error));
        Self {
            task_id: task_id.into(),
            worker_id: worker_id.into(),
            status: AgentStatus::Failed,
            output,
            confidence: 0.0,
            reasoning: error,
            recommendations: Vec::new(),
            next_steps: Vec::new(),
            delegated_tasks: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    pub fn with_next_steps(mut self, next_steps: Vec<String>) -> Self {
        self.next_steps = next_steps;
        self
    }

    pub fn with_delegated_tasks(mut self, delegated_tasks: Vec<String>) -> Self {
        self.delegated_tasks = delegated_tasks;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == AgentStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == AgentStatus::Failed
    }

    /// The `error` entry of a failed result's output, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.output.get("error").and_then(|v| v.as_str())
    }
}
