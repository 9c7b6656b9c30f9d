use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::errors::WorkerError;
use crate::types::{Task, TaskResult};

/// Tagged capability set a worker advertises for routing.
pub type CapabilitySet = BTreeSet<String>;

/// A polymorphic executor of tasks.
///
/// Implementations should always return a [`TaskResult`]; a domain failure belongs in a
/// `failed` result (see [`TaskResult::failed`]). The orchestrator additionally catches
/// panics inside `execute` and converts them the same way.
#[async_trait]
pub trait Worker: Send + Sync {
    fn id(&self) -> &str;

    fn capabilities(&self) -> &CapabilitySet;

    async fn execute(&self, task: Task) -> TaskResult;

    /// Free-form reasoning consultation. Workers without a reasoning backend keep the default.
    async fn reason(&self, _prompt: &str) -> Result<String, WorkerError> {
        Err(WorkerError::Unsupported(self.id().to_string()))
    }
}

/// Build a [`CapabilitySet`] from string-like tags.
pub fn capabilities<I, S>(tags: I) -> CapabilitySet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tags.into_iter().map(Into::into).collect()
}
