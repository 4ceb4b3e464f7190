// Application Layer - Job use cases and scheduling

pub mod constants;
pub mod heartbeat;
pub mod jobs;
pub mod reminders;
pub mod report;
pub mod restock;

// Re-exports
pub use heartbeat::HeartbeatJob;
pub use jobs::{shutdown_channel, JobOutcome, JobRunner, Schedule, ScheduledJob, ShutdownSender, ShutdownToken};
pub use reminders::{ReminderJob, ReminderRun};
pub use report::{DirectStoreStrategy, QueryLayerStrategy, ReportJob, ReportStrategy};
pub use restock::{RestockJob, RestockService};
