// Job Runner - time-based triggers for the CRM jobs

mod schedule;
mod shutdown;

pub use schedule::Schedule;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::port::TimeProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// How a single job run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(String),
    Failed(String),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed(_))
    }

    pub fn message(&self) -> &str {
        match self {
            JobOutcome::Completed(msg) | JobOutcome::Failed(msg) => msg,
        }
    }
}

/// A job the runner can trigger
///
/// `run` never panics or propagates errors: every failure is folded into
/// the returned outcome so the schedule loop keeps going.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self) -> JobOutcome;
}

/// Runs each registered job on its own schedule
///
/// One loop task per job: a job never overlaps itself, and a failed run
/// simply waits for the next trigger (no retries).
pub struct JobRunner {
    time_provider: Arc<dyn TimeProvider>,
    entries: Vec<(Schedule, Arc<dyn ScheduledJob>)>,
}

impl JobRunner {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            time_provider,
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, schedule: Schedule, job: Arc<dyn ScheduledJob>) {
        info!(job = job.name(), schedule = %schedule, "Job registered");
        self.entries.push((schedule, job));
    }

    pub fn job_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(_, job)| job.name()).collect()
    }

    /// Spawn one loop per job; each stops when `shutdown` fires
    pub fn spawn(self, shutdown: ShutdownToken) -> Vec<JoinHandle<()>> {
        self.entries
            .into_iter()
            .map(|(schedule, job)| {
                let time_provider = Arc::clone(&self.time_provider);
                let shutdown = shutdown.clone();
                tokio::spawn(run_loop(schedule, job, time_provider, shutdown))
            })
            .collect()
    }
}

async fn run_loop(
    schedule: Schedule,
    job: Arc<dyn ScheduledJob>,
    time_provider: Arc<dyn TimeProvider>,
    mut shutdown: ShutdownToken,
) {
    loop {
        if shutdown.is_shutdown() {
            break;
        }

        let now = time_provider.now();
        let Some(next) = schedule.next_after(now) else {
            error!(job = job.name(), schedule = %schedule, "No next fire time, stopping job loop");
            break;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        debug!(job = job.name(), next_run = %next, "Waiting for next trigger");

        tokio::select! {
            _ = sleep(wait) => {},
            _ = shutdown.wait() => break,
        }

        match job.run().await {
            JobOutcome::Completed(msg) => info!(job = job.name(), "{}", msg),
            JobOutcome::Failed(msg) => warn!(job = job.name(), "Job run failed: {}", msg),
        }
    }
    info!(job = job.name(), "Job loop stopped");
}
