// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::traits::CapabilitySet;

/// Capability routing policy for tasks without an explicit assignee.
///
/// Candidates are always scanned in registration order, so ties go to the worker that
/// registered first.
///
/// * `Substring` - first worker with a capability contained in the task type
/// * `MostSpecific` - worker with the longest capability contained in the task type
/// * `Exact` - first worker with a capability equal to the task type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    #[default]
    Substring,
    MostSpecific,
    Exact,
}

impl RoutingPolicy {
    pub fn name(self) -> &'static str {
        match self {
            RoutingPolicy::Substring => "substring",
            RoutingPolicy::MostSpecific => "most_specific",
            RoutingPolicy::Exact => "exact",
        }
    }

    /// Whether a single capability tag matches the task type under this policy.
    pub fn matches(self, capability: &str, task_type: &str) -> bool {
        if capability.is_empty() {
            return false;
        }
        match self {
            RoutingPolicy::Substring | RoutingPolicy::MostSpecific => task_type.contains(capability),
            RoutingPolicy::Exact => capability == task_type,
        }
    }

    /// Pick a worker id from `candidates`, which must be in registration order.
    pub fn select<'a, I>(self, task_type: &str, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = (&'a str, &'a CapabilitySet)>,
    {
        match self {
            RoutingPolicy::Substring | RoutingPolicy::Exact => candidates
                .into_iter()
                .find(|(_, caps)| caps.iter().any(|c| self.matches(c, task_type)))
                .map(|(id, _)| id),
            RoutingPolicy::MostSpecific => {
                let mut best: Option<(&'a str, usize)> = None;
                for (id, caps) in candidates {
                    let longest = caps
                        .iter()
                        .filter(|c| self.matches(c, task_type))
                        .map(String::len)
                        .max();
                    if let Some(len) = longest {
                        // Strictly longer only; equal length keeps the earlier registration.
                        if best.map_or(true, |(_, best_len)| len > best_len) {
                            best = Some((id, len));
                        }
                    }
                }
                best.map(|(id, _)| id)
            }
        }
    }
}

impl Display for RoutingPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
