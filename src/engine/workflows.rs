// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Workflow combinators over [`Orchestrator::execute_task`].
//!
//! * **Sequential**: tasks in order, optionally passing earlier results forward
//! * **Parallel**: tasks concurrently, outcomes in submission order
//! * **Conditional**: a condition task selects one of two sequential branches
//! * **Hub-and-spoke**: parallel spokes, then an optional synthesis task on the hub
//! * **Delegation**: one worker hands a task to another and is notified on completion

use futures::future::join_all;
use serde_json::{json, Value};
use tokio::time::Instant;

use super::Orchestrator;
use crate::config::consts::{CONDITION_MET_KEY, PREVIOUS_RESULTS_KEY, SPOKE_RESULTS_KEY, TASK_COMPLETED_MESSAGE};
use crate::errors::{FailurePolicy, OrchestrationError};
use crate::observability::messages::orchestrator::{WorkflowCompleted, WorkflowStarted};
use crate::observability::messages::StructuredLog;
use crate::types::{Task, TaskResult};

/// Outcome of one task in a parallel workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub task_id: String,
    pub result: Result<TaskResult, OrchestrationError>,
}

impl TaskOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn ok(&self) -> Option<&TaskResult> {
        self.result.as_ref().ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalOutcome {
    pub condition: TaskResult,
    pub condition_met: bool,
    pub branch: Vec<TaskResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HubSpokeOutcome {
    pub spokes: Vec<TaskOutcome>,
    pub synthesis: Option<TaskResult>,
}

impl Orchestrator {
    /// Execute tasks one at a time in order. The first raised error aborts the workflow.
    ///
    /// With `pass_context`, each task after the first gets `previous_results` in its input:
    /// one `{worker, output, recommendations}` entry per earlier task, in order.
    pub async fn execute_sequential(
        &self,
        tasks: Vec<Task>,
        pass_context: bool,
    ) -> Result<Vec<TaskResult>, OrchestrationError> {
        let started = Instant::now();
        WorkflowStarted {
            workflow: "sequential",
            task_count: tasks.len(),
        }
        .log();

        let mut results: Vec<TaskResult> = Vec::with_capacity(tasks.len());
        for mut task in tasks {
            if pass_context && !results.is_empty() {
                let previous: Vec<Value> = results
                    .iter()
                    .map(|r| {
                        json!({
                            "worker": r.worker_id,
                            "output": r.output,
                            "recommendations": r.recommendations,
                        })
                    })
                    .collect();
                task.input.insert(PREVIOUS_RESULTS_KEY.to_string(), Value::Array(previous));
            }
            results.push(self.execute_task(task).await?);
        }

        WorkflowCompleted {
            workflow: "sequential",
            succeeded: results.len(),
            failed: 0,
            duration: started.elapsed(),
        }
        .log();
        Ok(results)
    }

    /// Execute tasks concurrently under the configured [`FailurePolicy`].
    pub async fn execute_parallel(&self, tasks: Vec<Task>) -> Vec<TaskOutcome> {
        self.execute_parallel_with_policy(tasks, self.settings().parallel_failures)
            .await
    }

    /// Execute tasks concurrently. Outcomes keep submission order.
    ///
    /// A task that raised (routing, dependency timeout) is an `Err` outcome under
    /// [`FailurePolicy::Report`] and is omitted under [`FailurePolicy::Drop`]. A worker's
    /// `failed` result is a successful outcome either way.
    pub async fn execute_parallel_with_policy(&self, tasks: Vec<Task>, policy: FailurePolicy) -> Vec<TaskOutcome> {
        let started = Instant::now();
        WorkflowStarted {
            workflow: "parallel",
            task_count: tasks.len(),
        }
        .log();

        let runs = tasks.into_iter().map(|task| async move {
            let task_id = task.id.clone();
            TaskOutcome {
                task_id,
                result: self.execute_task(task).await,
            }
        });
        let outcomes = join_all(runs).await;

        let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
        WorkflowCompleted {
            workflow: "parallel",
            succeeded,
            failed: outcomes.len() - succeeded,
            duration: started.elapsed(),
        }
        .log();

        match policy {
            FailurePolicy::Report => outcomes,
            FailurePolicy::Drop => outcomes.into_iter().filter(TaskOutcome::is_ok).collect(),
        }
    }

    /// Run `condition`, then the `if_true` or `if_false` branch sequentially.
    ///
    /// The branch is chosen by the boolean `condition_met` in the condition result's output;
    /// a missing or non-boolean value counts as false.
    pub async fn execute_conditional(
        &self,
        condition: Task,
        if_true: Vec<Task>,
        if_false: Vec<Task>,
    ) -> Result<ConditionalOutcome, OrchestrationError> {
        let started = Instant::now();
        WorkflowStarted {
            workflow: "conditional",
            task_count: 1 + if_true.len().max(if_false.len()),
        }
        .log();

        let condition = self.execute_task(condition).await?;
        let condition_met = condition
            .output
            .get(CONDITION_MET_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        tracing::debug!(
            task_id = %condition.task_id,
            condition_met = condition_met,
            "Condition task '{}' evaluated to {}",
            condition.task_id,
            condition_met
        );

        let branch = if condition_met { if_true } else { if_false };
        let branch = self.execute_sequential(branch, false).await?;
        WorkflowCompleted {
            workflow: "conditional",
            succeeded: 1 + branch.len(),
            failed: 0,
            duration: started.elapsed(),
        }
        .log();
        Ok(ConditionalOutcome {
            condition,
            condition_met,
            branch,
        })
    }

    /// Fan `spokes` out in parallel, then optionally have the hub synthesize their results.
    ///
    /// The synthesis task is assigned to `hub_id` and receives `spoke_results`: one
    /// `{worker, output, confidence, recommendations}` entry per spoke that returned a result,
    /// in submission order.
    pub async fn execute_hub_and_spoke(
        &self,
        hub_id: &str,
        spokes: Vec<Task>,
        synthesis: Option<Task>,
    ) -> Result<HubSpokeOutcome, OrchestrationError> {
        if !self.is_registered(hub_id).await {
            return Err(OrchestrationError::AgentNotFound(hub_id.to_string()));
        }
        let started = Instant::now();
        WorkflowStarted {
            workflow: "hub_and_spoke",
            task_count: spokes.len() + usize::from(synthesis.is_some()),
        }
        .log();

        let spokes = self.execute_parallel(spokes).await;

        let synthesis = match synthesis {
            Some(mut task) => {
                let spoke_results: Vec<Value> = spokes
                    .iter()
                    .filter_map(TaskOutcome::ok)
                    .map(|r| {
                        json!({
                            "worker": r.worker_id,
                            "output": r.output,
                            "confidence": r.confidence,
                            "recommendations": r.recommendations,
                        })
                    })
                    .collect();
                task.input.insert(SPOKE_RESULTS_KEY.to_string(), Value::Array(spoke_results));
                task.assigned_to = Some(hub_id.to_string());
                Some(self.execute_task(task).await?)
            }
            None => None,
        };

        let answered = spokes.iter().filter(|o| o.is_ok()).count();
        WorkflowCompleted {
            workflow: "hub_and_spoke",
            succeeded: answered + usize::from(synthesis.is_some()),
            failed: spokes.len() - answered,
            duration: started.elapsed(),
        }
        .log();
        Ok(HubSpokeOutcome { spokes, synthesis })
    }

    /// `from` delegates `task` to `to`. On completion `to` sends `from` a `task_completed`
    /// message carrying the task id, status and output.
    pub async fn delegate_task(&self, from: &str, to: &str, mut task: Task) -> Result<TaskResult, OrchestrationError> {
        task.assigned_to = Some(to.to_string());
        task.delegated_by = Some(from.to_string());
        tracing::info!(
            from = from,
            to = to,
            task_id = %task.id,
            "Worker '{}' delegating task '{}' to '{}'",
            from,
            task.id,
            to
        );

        let result = self.execute_task(task).await?;
        self.send_message(
            to,
            from,
            json!({
                "type": TASK_COMPLETED_MESSAGE,
                "task_id": result.task_id,
                "status": result.status,
                "result": result.output,
            }),
        )
        .await;
        Ok(result)
    }
}
