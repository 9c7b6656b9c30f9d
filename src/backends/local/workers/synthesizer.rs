// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::consts::{PREVIOUS_RESULTS_KEY, SPOKE_RESULTS_KEY};
use crate::errors::WorkerError;
use crate::observability::messages::{worker::WorkerExecutionFailed, StructuredLog};
use crate::traits::{capabilities, CapabilitySet, Worker};
use crate::types::{Payload, Task, TaskResult};

/// Synthesizer worker - combines `spoke_results` (or `previous_results`) into one result
///
/// The synthesized confidence is the mean of the entries' confidences (entries without one
/// count as 1.0) and recommendations are merged in order without duplicates.
pub struct SynthesizerWorker {
    id: String,
    capabilities: CapabilitySet,
}

impl SynthesizerWorker {
    pub fn new<I, S>(id: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            capabilities: capabilities(tags),
        }
    }

    fn entries(task: &Task) -> Result<&Vec<Value>, WorkerError> {
        [SPOKE_RESULTS_KEY, PREVIOUS_RESULTS_KEY]
            .iter()
            .find_map(|key| task.input.get(*key))
            .ok_or_else(|| {
                WorkerError::InvalidInput(format!(
                    "expected '{}' or '{}' in task input",
                    SPOKE_RESULTS_KEY, PREVIOUS_RESULTS_KEY
                ))
            })?
            .as_array()
            .ok_or_else(|| WorkerError::InvalidInput("results must be a list".to_string()))
    }
}

#[async_trait]
impl Worker for SynthesizerWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn execute(&self, task: Task) -> TaskResult {
        let entries = match Self::entries(&task) {
            Ok(entries) => entries,
            Err(error) => {
                WorkerExecutionFailed {
                    worker_id: &self.id,
                    task_id: &task.id,
                    error: &error,
                }
                .log();
                return TaskResult::failed(task.id.clone(), &self.id, error.to_string());
            }
        };

        let mut workers = Vec::with_capacity(entries.len());
        let mut recommendations: Vec<String> = Vec::new();
        let mut confidence_sum = 0.0;

        for entry in entries {
            if let Some(worker) = entry.get("worker").and_then(Value::as_str) {
                workers.push(worker.to_string());
            }
            confidence_sum += entry.get("confidence").and_then(Value::as_f64).unwrap_or(1.0);
            let merged = entry
                .get("recommendations")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str);
            for recommendation in merged {
                if !recommendations.iter().any(|r| r == recommendation) {
                    recommendations.push(recommendation.to_string());
                }
            }
        }

        let mean_confidence = if entries.is_empty() {
            0.0
        } else {
            confidence_sum / entries.len() as f64
        };

        let mut output = Payload::new();
        output.insert("source_count".to_string(), json!(entries.len()));
        output.insert("workers".to_string(), json!(workers));
        output.insert("mean_confidence".to_string(), json!(mean_confidence));

        TaskResult::completed(task.id.clone(), &self.id, output)
            .with_confidence(mean_confidence)
            .with_recommendations(recommendations)
            .with_reasoning(format!("Synthesized {} result(s)", entries.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn merges_spoke_results() {
        let worker = SynthesizerWorker::new("hub", ["synthesis"]);
        let task = Task::new("synthesis", "combine").with_input_value(
            SPOKE_RESULTS_KEY,
            json!([
                {"worker": "a", "output": {}, "confidence": 0.5, "recommendations": ["hire", "ship"]},
                {"worker": "b", "output": {}, "confidence": 1.0, "recommendations": ["ship", "wait"]},
            ]),
        );

        let result = worker.execute(task).await;
        assert!(result.is_completed());
        assert_eq!(result.confidence, 0.75);
        assert_eq!(result.recommendations, vec!["hire", "ship", "wait"]);
        assert_eq!(result.output["workers"], json!(["a", "b"]));
        assert_eq!(result.output["source_count"], json!(2));
    }

    #[tokio::test]
    async fn falls_back_to_previous_results() {
        let worker = SynthesizerWorker::new("hub", ["synthesis"]);
        let task = Task::new("synthesis", "combine")
            .with_input_value(PREVIOUS_RESULTS_KEY, json!([{"worker": "a", "output": {}}]));
        let result = worker.execute(task).await;
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.output["workers"], json!(["a"]));
    }

    #[tokio::test]
    async fn missing_results_is_a_failed_result() {
        let worker = SynthesizerWorker::new("hub", ["synthesis"]);
        let result = worker.execute(Task::new("synthesis", "combine")).await;
        assert!(result.is_failed());
        assert!(result.error_message().unwrap().contains(SPOKE_RESULTS_KEY));
    }
}
