// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker status state machine.
//!
//! `AgentStatus::apply` is total: every `(status, event)` pair either yields the next
//! status or an [`InvalidTransition`]. Terminal states (`Completed`, `Failed`) are
//! resting states; they persist until the next dispatch or an explicit `Reset`.
//!
//! ```text
//! Idle|Completed|Failed --BeginThinking--> Thinking --FinishThinking--> Idle
//!                                          Thinking --Fail-----------> Failed
//! Idle|Completed|Failed|Waiting|Working --BeginWork--> Working --Complete--> Completed
//!                                                      Working --Fail------> Failed
//! Idle|Completed|Failed --Wait--> Waiting
//! Idle|Completed|Failed|Waiting --Reset--> Idle
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    Thinking,
    Working,
    Waiting,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEvent {
    BeginThinking,
    FinishThinking,
    BeginWork,
    Wait,
    Complete,
    Fail,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid status transition: {from} on {event:?}")]
pub struct InvalidTransition {
    pub from: AgentStatus,
    pub event: StatusEvent,
}

impl AgentStatus {
    /// Compute the status that follows `event`.
    pub fn apply(self, event: StatusEvent) -> Result<AgentStatus, InvalidTransition> {
        use AgentStatus::*;
        use StatusEvent::*;

        let next = match (self, event) {
            (Idle | Completed | Failed, BeginThinking) => Thinking,
            (Thinking, FinishThinking) => Idle,
            (Thinking, Fail) => Failed,
            (Idle | Completed | Failed | Waiting | Working, BeginWork) => Working,
            (Idle | Completed | Failed, Wait) => Waiting,
            (Working, Complete) => Completed,
            (Working, Fail) => Failed,
            (Idle | Completed | Failed | Waiting, Reset) => Idle,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }

    /// Whether the worker is between tasks (nothing in progress).
    pub fn is_resting(self) -> bool {
        matches!(self, AgentStatus::Idle | AgentStatus::Completed | AgentStatus::Failed)
    }
}

impl Display for AgentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Thinking => "thinking",
            AgentStatus::Working => "working",
            AgentStatus::Waiting => "waiting",
            AgentStatus::Completed => "completed",
            AgentStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::AgentStatus::*;
    use super::StatusEvent::*;
    use super::*;

    #[test]
    fn execution_path() {
        let status = Idle.apply(BeginWork).unwrap();
        assert_eq!(status, Working);
        assert_eq!(status.apply(Complete).unwrap(), Completed);
        assert_eq!(status.apply(Fail).unwrap(), Failed);
    }

    #[test]
    fn reasoning_path() {
        let status = Idle.apply(BeginThinking).unwrap();
        assert_eq!(status, Thinking);
        assert_eq!(status.apply(FinishThinking).unwrap(), Idle);
        assert_eq!(status.apply(Fail).unwrap(), Failed);
    }

    #[test]
    fn terminal_states_accept_new_work_and_reset() {
        for terminal in [Completed, Failed] {
            assert_eq!(terminal.apply(BeginWork).unwrap(), Working);
            assert_eq!(terminal.apply(Reset).unwrap(), Idle);
        }
    }

    #[test]
    fn busy_states_reject_reset() {
        assert!(Working.apply(Reset).is_err());
        assert!(Thinking.apply(Reset).is_err());
        assert!(Thinking.apply(BeginWork).is_err());
    }

    #[test]
    fn every_pair_is_defined() {
        let statuses = [Idle, Thinking, Working, Waiting, Completed, Failed];
        let events = [BeginThinking, FinishThinking, BeginWork, Wait, Complete, Fail, Reset];
        for s in statuses {
            for e in events {
                match s.apply(e) {
                    Ok(_) => {}
                    Err(err) => {
                        assert_eq!(err.from, s);
                        assert_eq!(err.event, e);
                    }
                }
            }
        }
    }

    #[test]
    fn waiting_then_work() {
        let status = Idle.apply(Wait).unwrap();
        assert_eq!(status, Waiting);
        assert_eq!(status.apply(BeginWork).unwrap(), Working);
        assert!(status.apply(Complete).is_err());
    }
}
