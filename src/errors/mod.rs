// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod orchestration;
mod resource;
mod worker;

pub use config::ValidationError;
pub use orchestration::{FailurePolicy, OrchestrationError};
pub use resource::ResourceError;
pub use worker::WorkerError;
