// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout The Conclave. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep log field names consistent between call sites
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::orchestrator` - Worker registry, dispatch, dependency gating and workflows
//! * `messages::worker` - Worker execution lifecycle events
//! * `messages::resource` - Resource arbitration events
//! * `messages::validation` - Configuration validation errors
//!
//! # Usage
//!
//! ```rust
//! use the_conclave::observability::messages::worker::WorkerExecutionFailed;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! let msg = WorkerExecutionFailed {
//!     worker_id: "analyst",
//!     task_id: "t1",
//!     error: &error,
//! };
//!
//! tracing::error!("{}", msg);
//! ```

pub mod messages;
