// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod runtime;
mod validation;

pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, Config, EnvironmentOptions, OrchestratorOptions,
    ResourceConfig, TaskConfig, WorkerConfig,
};
pub use runtime::{Runtime, RuntimeBuilder};
pub use validation::{dependency_order, validate_config};
