// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for human-readable output and
//! [`StructuredLog`] to emit the same event with typed `tracing` fields.
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_conclave::observability::messages::StructuredLog;
//! use the_conclave::observability::messages::orchestrator::WorkflowStarted;
//!
//! let msg = WorkflowStarted {
//!     workflow: "parallel",
//!     task_count: 5,
//! };
//!
//! let span = msg.span("parallel_workflow");
//! let _guard = span.enter();
//! msg.log();
//! ```

use tracing::Span;

pub mod orchestrator;
pub mod resource;
pub mod validation;
pub mod worker;

/// A log event with structured fields.
pub trait StructuredLog {
    /// Emit the event at its designated level.
    fn log(&self);

    /// Open a span carrying the event's fields.
    fn span(&self, name: &str) -> Span;
}
