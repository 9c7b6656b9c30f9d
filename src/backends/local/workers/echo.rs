// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::traits::{capabilities, CapabilitySet, Worker};
use crate::types::{Payload, Task, TaskResult};

/// Echo worker - returns the task input under `echo`, tagged with the task type
pub struct EchoWorker {
    id: String,
    capabilities: CapabilitySet,
    confidence: f64,
}

impl EchoWorker {
    pub fn new<I, S>(id: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            capabilities: capabilities(tags),
            confidence: 1.0,
        }
    }

    /// Reported confidence, clamped to `[0, 1]`.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

#[async_trait]
impl Worker for EchoWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn execute(&self, task: Task) -> TaskResult {
        let mut output = Payload::new();
        output.insert("task_type".to_string(), Value::String(task.task_type.clone()));
        output.insert("echo".to_string(), Value::Object(task.input));

        TaskResult::completed(task.id, &self.id, output)
            .with_confidence(self.confidence)
            .with_reasoning(format!("Echoed input for '{}'", task.task_type))
    }

    async fn reason(&self, prompt: &str) -> Result<String, crate::errors::WorkerError> {
        Ok(prompt.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn echoes_input_and_type() {
        let worker = EchoWorker::new("echo", ["analysis"]).with_confidence(0.4);
        let task = Task::new("market_analysis", "size it").with_input_value("region", json!("emea"));
        let task_id = task.id.clone();

        let result = worker.execute(task).await;
        assert!(result.is_completed());
        assert_eq!(result.task_id, task_id);
        assert_eq!(result.output["task_type"], json!("market_analysis"));
        assert_eq!(result.output["echo"], json!({"region": "emea"}));
        assert_eq!(result.confidence, 0.4);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(EchoWorker::new("e", ["x"]).with_confidence(7.0).confidence, 1.0);
    }

    #[tokio::test]
    async fn reasoning_echoes_prompt() {
        let worker = EchoWorker::new("echo", ["analysis"]);
        assert_eq!(worker.reason("why?").await.unwrap(), "why?");
    }
}
