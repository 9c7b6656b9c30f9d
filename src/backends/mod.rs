// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker backend implementations for The Conclave.
//!
//! Each backend implements the [`Worker`](crate::traits::Worker) trait and can be
//! instantiated through a configuration-driven factory.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process Rust workers usable straight from a YAML config:
//! - **echo**: Returns the task input, useful for wiring and smoke tests
//! - **condition**: Evaluates one input field as the `condition_met` flag for conditional workflows
//! - **synthesizer**: Merges `spoke_results` or `previous_results` into one result
//!
//! ## Stub Backend (Test-Only)
//! Testing utilities for orchestrator development (only available in test builds):
//! - **StubWorker**: Completes every task, optionally answers reasoning requests
//! - **FailingWorker**: Returns a `failed` result
//! - **PanickingWorker**: Panics inside `execute` and `reason`
//! - **SlowWorker**: Sleeps before completing
//! - **RecordingWorker**: Records every task input it receives
//!
//! # Examples
//!
//! ```rust
//! use the_conclave::backends::local::LocalWorkerFactory;
//! use the_conclave::config::WorkerConfig;
//! use the_conclave::traits::Worker;
//! use std::collections::HashMap;
//!
//! let config = WorkerConfig {
//!     id: "gate".to_string(),
//!     kind: "condition".to_string(),
//!     capabilities: vec!["gate".to_string()],
//!     options: HashMap::new(),
//! };
//!
//! let worker = LocalWorkerFactory::create_worker(&config)?;
//! assert_eq!(worker.id(), "gate");
//! # Ok::<(), String>(())
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
