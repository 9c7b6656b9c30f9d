// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::workers::*;
use crate::config::WorkerConfig;
use crate::traits::Worker;

/// Factory for creating local (in-process) worker instances
pub struct LocalWorkerFactory;

impl LocalWorkerFactory {
    /// Create a worker instance from configuration
    ///
    /// The `kind` field in the config determines which worker to create:
    /// - "echo" -> EchoWorker (option `confidence`, default 1.0)
    /// - "condition" -> ConditionWorker (option `field`, default "condition")
    /// - "synthesizer" -> SynthesizerWorker
    pub fn create_worker(config: &WorkerConfig) -> Result<Arc<dyn Worker>, String> {
        let tags = config.capabilities.iter().cloned();

        match config.kind.as_str() {
            "echo" => {
                let mut worker = EchoWorker::new(&config.id, tags);
                if let Some(value) = config.options.get("confidence") {
                    let confidence = value.as_f64().ok_or_else(|| {
                        format!("Worker '{}': option 'confidence' must be a number", config.id)
                    })?;
                    worker = worker.with_confidence(confidence);
                }
                Ok(Arc::new(worker))
            }
            "condition" => {
                let field = match config.options.get("field") {
                    Some(value) => value
                        .as_str()
                        .ok_or_else(|| format!("Worker '{}': option 'field' must be a string", config.id))?
                        .to_string(),
                    None => ConditionWorker::DEFAULT_FIELD.to_string(),
                };
                Ok(Arc::new(ConditionWorker::new(&config.id, tags, field)))
            }
            "synthesizer" => Ok(Arc::new(SynthesizerWorker::new(&config.id, tags))),
            _ => Err(format!("Unknown local worker kind: '{}'", config.kind)),
        }
    }

    /// List all available local worker kinds
    pub fn list_available_kinds() -> Vec<&'static str> {
        vec!["echo", "condition", "synthesizer"]
    }

    /// Check if a worker kind is available
    pub fn is_known_kind(kind: &str) -> bool {
        Self::list_available_kinds().contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(kind: &str, options: &[(&str, serde_yaml::Value)]) -> WorkerConfig {
        WorkerConfig {
            id: format!("{kind}-worker"),
            kind: kind.to_string(),
            capabilities: vec!["analysis".to_string()],
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn creates_every_listed_kind() {
        for kind in LocalWorkerFactory::list_available_kinds() {
            let worker = LocalWorkerFactory::create_worker(&config(kind, &[])).unwrap();
            assert_eq!(worker.id(), format!("{kind}-worker"));
            assert!(worker.capabilities().contains("analysis"));
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = LocalWorkerFactory::create_worker(&config("oracle", &[])).err().unwrap();
        assert!(err.contains("oracle"));
        assert!(!LocalWorkerFactory::is_known_kind("oracle"));
    }

    #[test]
    fn rejects_mistyped_options() {
        let bad = config("condition", &[("field", serde_yaml::Value::Bool(true))]);
        assert!(LocalWorkerFactory::create_worker(&bad).is_err());

        let bad = config("echo", &[("confidence", serde_yaml::Value::String("high".into()))]);
        assert!(LocalWorkerFactory::create_worker(&bad).is_err());
    }
}
