// Order Reminder Use Case

use crate::application::constants::LOG_TIMESTAMP_FORMAT;
use crate::application::jobs::{JobOutcome, ScheduledJob};
use crate::domain::{OrderFilter, OrderId};
use crate::error::Result;
use crate::port::{CrmApi, LogSink, TimeProvider};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Counters for one reminder pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRun {
    pub cutoff: DateTime<Utc>,
    /// Orders returned by the query
    pub found: usize,
    /// Reminder lines written
    pub logged: usize,
    /// Orders without an ID or customer email (their IDs, when known)
    pub skipped: Vec<Option<OrderId>>,
}

/// Logs a reminder for every order placed since the cutoff
pub struct ReminderJob {
    api: Arc<dyn CrmApi>,
    sink: Arc<dyn LogSink>,
    time_provider: Arc<dyn TimeProvider>,
    lookback_days: i64,
}

impl ReminderJob {
    pub fn new(
        api: Arc<dyn CrmApi>,
        sink: Arc<dyn LogSink>,
        time_provider: Arc<dyn TimeProvider>,
        lookback_days: i64,
    ) -> Self {
        Self {
            api,
            sink,
            time_provider,
            lookback_days,
        }
    }

    /// Start of the UTC day `lookback_days` before now (inclusive bound)
    pub fn cutoff(&self) -> DateTime<Utc> {
        let day = self.time_provider.now().date_naive() - Duration::days(self.lookback_days);
        day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Query recent orders and write one line per order that has an email
    pub async fn process(&self) -> Result<ReminderRun> {
        let cutoff = self.cutoff();
        let orders = self.api.orders(&OrderFilter::since(cutoff)).await?;

        let mut run = ReminderRun {
            cutoff,
            found: orders.len(),
            logged: 0,
            skipped: Vec::new(),
        };

        for order in &orders {
            let (Some(id), Some(email)) = (order.id, order.customer_email()) else {
                warn!(order_id = ?order.id, "Order has no customer email, skipping");
                run.skipped.push(order.id);
                continue;
            };

            let line = format!(
                "[{}] Order ID: {}, Customer Email: {}",
                self.time_provider.now().format(LOG_TIMESTAMP_FORMAT),
                id,
                email
            );
            match self.sink.append_line(&line).await {
                Ok(()) => run.logged += 1,
                Err(e) => error!(
                    error = %e,
                    order_id = id,
                    path = self.sink.location(),
                    "Error writing reminder log"
                ),
            }
        }

        Ok(run)
    }

    pub fn summary(&self, run: &ReminderRun) -> String {
        if run.found == 0 {
            format!(
                "No pending orders found within the last {} days.",
                self.lookback_days
            )
        } else {
            format!(
                "Order reminders processed! {} logged, {} skipped",
                run.logged,
                run.skipped.len()
            )
        }
    }
}

#[async_trait]
impl ScheduledJob for ReminderJob {
    fn name(&self) -> &'static str {
        "reminders"
    }

    async fn run(&self) -> JobOutcome {
        match self.process().await {
            Ok(run) => {
                info!(
                    cutoff = %run.cutoff,
                    found = run.found,
                    logged = run.logged,
                    skipped = run.skipped.len(),
                    "Order reminders processed"
                );
                JobOutcome::Completed(self.summary(&run))
            }
            Err(e) => {
                error!(error = %e, "Error querying orders for reminders");
                JobOutcome::Failed(format!("Error querying orders: {}", e))
            }
        }
    }
}
