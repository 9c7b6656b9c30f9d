// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod condition;
pub mod echo;
pub mod synthesizer;

pub use condition::*;
pub use echo::*;
pub use synthesizer::*;
