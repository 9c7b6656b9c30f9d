pub mod mailbox;
pub mod orchestrator;
mod registry;
pub mod routing;
pub mod workflows;

pub use mailbox::{Mailbox, MailboxEntry};
pub use orchestrator::{Orchestrator, OrchestratorSettings, OrchestratorStatus, WorkerSnapshot};
pub use routing::RoutingPolicy;
pub use workflows::{ConditionalOutcome, HubSpokeOutcome, TaskOutcome};
