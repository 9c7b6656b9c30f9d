use std::time::Duration;

/// Default budget for a task waiting on its dependencies (300 seconds)
pub const DEFAULT_DEPENDENCY_TIMEOUT: Duration = Duration::from_secs(300);
/// Default wait for a resource request that does not pass its own timeout
pub const DEFAULT_RESOURCE_TIMEOUT: Duration = Duration::from_secs(30);
/// Event log ring buffer size; the oldest event is dropped beyond this
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 10_000;
/// Input key under which sequential workflows pass earlier results forward
pub const PREVIOUS_RESULTS_KEY: &str = "previous_results";
/// Input key under which hub-and-spoke synthesis tasks receive spoke results
pub const SPOKE_RESULTS_KEY: &str = "spoke_results";
/// Output key a conditional workflow's condition task sets
pub const CONDITION_MET_KEY: &str = "condition_met";
/// Message type sent back to the delegator when a delegated task finishes
pub const TASK_COMPLETED_MESSAGE: &str = "task_completed";
