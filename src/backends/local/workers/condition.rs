// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::config::consts::CONDITION_MET_KEY;
use crate::traits::{capabilities, CapabilitySet, Worker};
use crate::types::{Payload, Task, TaskResult};

/// Condition worker - reports whether one input field is truthy as `condition_met`
///
/// Truthiness: booleans as-is, non-zero numbers, non-empty strings, arrays and objects.
/// A missing field or `null` is false.
pub struct ConditionWorker {
    id: String,
    capabilities: CapabilitySet,
    field: String,
}

impl ConditionWorker {
    pub const DEFAULT_FIELD: &'static str = "condition";

    pub fn new<I, S>(id: impl Into<String>, tags: I, field: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            capabilities: capabilities(tags),
            field: field.into(),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[async_trait]
impl Worker for ConditionWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn execute(&self, task: Task) -> TaskResult {
        let met = task.input.get(&self.field).is_some_and(is_truthy);

        let mut output = Payload::new();
        output.insert(CONDITION_MET_KEY.to_string(), Value::Bool(met));
        output.insert("field".to_string(), Value::String(self.field.clone()));

        TaskResult::completed(task.id, &self.id, output)
            .with_reasoning(format!("Field '{}' is {}", self.field, if met { "truthy" } else { "falsy" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn evaluate(input: Value) -> bool {
        let worker = ConditionWorker::new("gate", ["gate"], "approved");
        let mut task = Task::new("gate", "check approval");
        if let Value::Object(map) = input {
            task = task.with_input(map);
        }
        worker.execute(task).await.output[CONDITION_MET_KEY] == json!(true)
    }

    #[tokio::test]
    async fn truthiness_rules() {
        assert!(evaluate(json!({"approved": true})).await);
        assert!(evaluate(json!({"approved": 3})).await);
        assert!(evaluate(json!({"approved": "yes"})).await);
        assert!(!evaluate(json!({"approved": false})).await);
        assert!(!evaluate(json!({"approved": 0})).await);
        assert!(!evaluate(json!({"approved": ""})).await);
        assert!(!evaluate(json!({"approved": null})).await);
        assert!(!evaluate(json!({})).await);
    }
}
