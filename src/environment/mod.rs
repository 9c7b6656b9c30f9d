// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Resource environment: named resources with access-mode arbitration, an append-only
//! event log and a flat shared key/value store.
//!
//! # Concurrency
//!
//! The environment is shared between tasks running on a multi-threaded runtime, so every
//! piece of mutable state sits behind an explicit lock:
//!
//! * the resource table is a `RwLock<HashMap<..>>` of per-resource slots
//! * each slot guards its [`Resource`] with a `Mutex` and wakes waiters through a `Notify`
//! * the event log and the shared store each have their own lock
//!
//! Locks are never held across a wait. A requester that cannot be granted access registers
//! for the slot's release notification, drops the lock, and retries when woken. Grants are
//! first-come-first-observed, not FIFO.

mod arbiter;
mod event_log;
mod resource;

pub use arbiter::{Environment, EnvironmentStatus, ResourceUsage};
pub use event_log::{EnvironmentEvent, EventLog, EventQuery, EventType};
pub use resource::{AccessMode, Resource, ResourceSpec};
