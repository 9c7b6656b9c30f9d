// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::errors::WorkerError;
use crate::traits::{capabilities, CapabilitySet, Worker};
use crate::types::{Payload, Task, TaskResult};

/// A stub worker for testing: completes every task with `{handled_by, task_type}`
pub struct StubWorker {
    pub id: String,
    capabilities: CapabilitySet,
    confidence: f64,
    recommendations: Vec<String>,
    answer: Option<String>,
}

impl StubWorker {
    pub fn new<I, S>(id: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            capabilities: capabilities(tags),
            confidence: 1.0,
            recommendations: Vec::new(),
            answer: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_recommendations(mut self, recommendations: &[&str]) -> Self {
        self.recommendations = recommendations.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Answer reasoning requests with `answer`.
    pub fn with_answer(mut self, answer: &str) -> Self {
        self.answer = Some(answer.to_string());
        self
    }
}

fn stub_output(worker_id: &str, task: &Task) -> Payload {
    let mut output = Payload::new();
    output.insert("handled_by".to_string(), json!(worker_id));
    output.insert("task_type".to_string(), json!(task.task_type));
    output
}

#[async_trait]
impl Worker for StubWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn execute(&self, task: Task) -> TaskResult {
        let output = stub_output(&self.id, &task);
        TaskResult::completed(task.id, &self.id, output)
            .with_confidence(self.confidence)
            .with_recommendations(self.recommendations.clone())
    }

    async fn reason(&self, prompt: &str) -> Result<String, WorkerError> {
        match &self.answer {
            Some(answer) => Ok(format!("{answer}: {prompt}")),
            None => Err(WorkerError::Unsupported(self.id.clone())),
        }
    }
}

/// A worker that always returns a failed result for testing failure scenarios
pub struct FailingWorker {
    pub id: String,
    capabilities: CapabilitySet,
}

impl FailingWorker {
    pub fn new<I, S>(id: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            capabilities: capabilities(tags),
        }
    }
}

#[async_trait]
impl Worker for FailingWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn execute(&self, task: Task) -> TaskResult {
        TaskResult::failed(task.id, &self.id, "Simulated worker failure")
    }
}

/// A worker that panics inside `execute` and `reason`
pub struct PanickingWorker {
    pub id: String,
    capabilities: CapabilitySet,
}

impl PanickingWorker {
    pub fn new<I, S>(id: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            capabilities: capabilities(tags),
        }
    }
}

#[async_trait]
impl Worker for PanickingWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn execute(&self, task: Task) -> TaskResult {
        panic!("worker exploded on task {}", task.id);
    }

    async fn reason(&self, prompt: &str) -> Result<String, WorkerError> {
        panic!("worker exploded while reasoning about {prompt:?}");
    }
}

/// A worker that sleeps before completing, to hold tasks in flight
pub struct SlowWorker {
    pub id: String,
    capabilities: CapabilitySet,
    delay: Duration,
}

impl SlowWorker {
    pub fn new<I, S>(id: &str, tags: I, delay: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            capabilities: capabilities(tags),
            delay,
        }
    }
}

#[async_trait]
impl Worker for SlowWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn execute(&self, task: Task) -> TaskResult {
        tokio::time::sleep(self.delay).await;
        let output = stub_output(&self.id, &task);
        TaskResult::completed(task.id, &self.id, output)
    }
}

/// A worker that records every task input it receives
pub struct RecordingWorker {
    pub id: String,
    capabilities: CapabilitySet,
    received: Mutex<Vec<Payload>>,
}

impl RecordingWorker {
    pub fn new<I, S>(id: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            capabilities: capabilities(tags),
            received: Mutex::new(Vec::new()),
        }
    }

    pub async fn received(&self) -> Vec<Payload> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl Worker for RecordingWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn execute(&self, task: Task) -> TaskResult {
        self.received.lock().await.push(task.input.clone());
        let mut output = stub_output(&self.id, &task);
        output.insert("step".to_string(), Value::from(self.received.lock().await.len()));
        TaskResult::completed(task.id, &self.id, output)
            .with_recommendations(vec![format!("{}-recommendation", self.id)])
    }
}
