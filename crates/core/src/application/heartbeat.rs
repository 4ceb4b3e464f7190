// Heartbeat Use Case

use crate::application::constants::HEARTBEAT_TIMESTAMP_FORMAT;
use crate::application::jobs::{JobOutcome, ScheduledJob};
use crate::port::{CrmApi, LogSink, TimeProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// Writes one liveness line per run, optionally probing the query endpoint
pub struct HeartbeatJob {
    /// None disables the probe
    api: Option<Arc<dyn CrmApi>>,
    sink: Arc<dyn LogSink>,
    time_provider: Arc<dyn TimeProvider>,
}

impl HeartbeatJob {
    pub fn new(
        api: Option<Arc<dyn CrmApi>>,
        sink: Arc<dyn LogSink>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            api,
            sink,
            time_provider,
        }
    }

    /// Build the heartbeat line for this instant
    pub async fn heartbeat_line(&self) -> String {
        let ts = self.time_provider.now().format(HEARTBEAT_TIMESTAMP_FORMAT);
        let Some(api) = &self.api else {
            return format!("{} CRM is alive", ts);
        };

        match api.hello().await {
            Ok(greeting) => {
                format!("{} CRM is alive - query endpoint responsive: {}", ts, greeting)
            }
            Err(e) => {
                debug!(error = %e, "Heartbeat probe failed");
                format!("{} CRM is alive - query endpoint not responsive", ts)
            }
        }
    }
}

#[async_trait]
impl ScheduledJob for HeartbeatJob {
    fn name(&self) -> &'static str {
        "heartbeat"
    }

    async fn run(&self) -> JobOutcome {
        let line = self.heartbeat_line().await;
        match self.sink.append_line(&line).await {
            Ok(()) => JobOutcome::Completed(line),
            Err(e) => {
                error!(error = %e, path = self.sink.location(), "Error writing heartbeat log");
                JobOutcome::Failed(format!("Error writing heartbeat log: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::crm_api::mocks::StaticCrmApi;
    use crate::port::log_sink::mocks::MemoryLogSink;
    use crate::port::time_provider::FixedTimeProvider;
    use chrono::{NaiveDateTime, TimeZone, Utc};

    fn clock() -> Arc<FixedTimeProvider> {
        Arc::new(FixedTimeProvider::new(
            Utc.with_ymd_and_hms(2025, 6, 2, 14, 5, 9).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_responsive_line() {
        let sink = MemoryLogSink::new();
        let job = HeartbeatJob::new(
            Some(Arc::new(StaticCrmApi::new())),
            Arc::new(sink.clone()),
            clock(),
        );

        assert!(job.run().await.is_success());
        assert_eq!(
            sink.lines(),
            vec!["02/06/2025-14:05:09 CRM is alive - query endpoint responsive: Hello World!".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_still_writes_one_line() {
        let sink = MemoryLogSink::new();
        let job = HeartbeatJob::new(
            Some(Arc::new(StaticCrmApi::unreachable("connection refused"))),
            Arc::new(sink.clone()),
            clock(),
        );

        assert!(job.run().await.is_success());
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("CRM is alive - query endpoint not responsive"));

        let ts = lines[0].split(' ').next().unwrap();
        assert!(NaiveDateTime::parse_from_str(ts, HEARTBEAT_TIMESTAMP_FORMAT).is_ok());
    }

    #[tokio::test]
    async fn test_probe_disabled() {
        let sink = MemoryLogSink::new();
        let job = HeartbeatJob::new(None, Arc::new(sink.clone()), clock());

        job.run().await;
        assert_eq!(sink.lines(), vec!["02/06/2025-14:05:09 CRM is alive".to_string()]);
    }

    #[tokio::test]
    async fn test_write_failure_is_contained() {
        let job = HeartbeatJob::new(None, Arc::new(MemoryLogSink::failing()), clock());

        let outcome = job.run().await;
        assert!(!outcome.is_success());
        assert!(outcome.message().contains("read-only"));
    }
}
