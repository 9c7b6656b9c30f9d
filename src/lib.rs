// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;    // worker backends
pub mod config;      // config loading, validation, runtime
pub mod engine;      // orchestrator + workflows
pub mod environment; // resource arbitration, events, shared state
pub mod errors;      // error handling
pub mod observability;
pub mod traits;      // worker abstraction
pub mod types;       // tasks, results, statuses
