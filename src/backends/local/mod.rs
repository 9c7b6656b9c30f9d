// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod factory;
pub mod workers;

pub use factory::LocalWorkerFactory;
pub use workers::*;
