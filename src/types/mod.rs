// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared vocabulary for workers, the orchestrator and the resource environment.
//!
//! These are the structures an external persistence collaborator would serialize;
//! every one of them derives `Serialize`/`Deserialize`.

pub mod result;
pub mod status;
pub mod task;

pub use result::TaskResult;
pub use status::{AgentStatus, InvalidTransition, StatusEvent};
pub use task::Task;

/// Opaque key/value payload carried by tasks, results, resources and messages.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Generate a fresh identifier for tasks, resources and events.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
