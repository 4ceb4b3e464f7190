// CRM Report Use Case

use crate::application::constants::LOG_TIMESTAMP_FORMAT;
use crate::application::jobs::{JobOutcome, ScheduledJob};
use crate::domain::{CustomerFilter, OrderFilter, ReportSummary, ReportTotals};
use crate::error::Result;
use crate::port::{CrmApi, CustomerRepository, LogSink, OrderRepository, TimeProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One way of collecting the report numbers
#[async_trait]
pub trait ReportStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn collect(&self) -> Result<ReportTotals>;
}

/// Counts through the query layer: list lengths and summed amounts
pub struct QueryLayerStrategy {
    api: Arc<dyn CrmApi>,
}

impl QueryLayerStrategy {
    pub fn new(api: Arc<dyn CrmApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ReportStrategy for QueryLayerStrategy {
    fn name(&self) -> &'static str {
        "query-layer"
    }

    async fn collect(&self) -> Result<ReportTotals> {
        let customers = self.api.customers(&CustomerFilter::default()).await?;
        let orders = self.api.orders(&OrderFilter::default()).await?;
        let revenue = ReportTotals::sum_amounts(orders.iter().map(|o| o.total_amount));
        Ok(ReportTotals::new(
            customers.len() as i64,
            orders.len() as i64,
            revenue,
        ))
    }
}

/// Aggregates straight from the store
pub struct DirectStoreStrategy {
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl DirectStoreStrategy {
    pub fn new(customers: Arc<dyn CustomerRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { customers, orders }
    }
}

#[async_trait]
impl ReportStrategy for DirectStoreStrategy {
    fn name(&self) -> &'static str {
        "direct-store"
    }

    async fn collect(&self) -> Result<ReportTotals> {
        let total_customers = self.customers.count().await?;
        let total_orders = self.orders.count().await?;
        let total_revenue = self.orders.revenue_sum().await?;
        Ok(ReportTotals::new(total_customers, total_orders, total_revenue))
    }
}

/// Weekly report: primary strategy, then the fallback on any error
pub struct ReportJob {
    primary: Arc<dyn ReportStrategy>,
    fallback: Option<Arc<dyn ReportStrategy>>,
    sink: Arc<dyn LogSink>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ReportJob {
    pub fn new(
        primary: Arc<dyn ReportStrategy>,
        fallback: Option<Arc<dyn ReportStrategy>>,
        sink: Arc<dyn LogSink>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            primary,
            fallback,
            sink,
            time_provider,
        }
    }

    /// Collect the numbers without writing anything
    pub async fn generate(&self) -> Result<ReportSummary> {
        let (source, totals) = match self.primary.collect().await {
            Ok(totals) => (self.primary.name(), totals),
            Err(primary_err) => match &self.fallback {
                Some(fallback) => {
                    warn!(
                        strategy = self.primary.name(),
                        error = %primary_err,
                        fallback = fallback.name(),
                        "Report strategy failed, falling back"
                    );
                    (fallback.name(), fallback.collect().await?)
                }
                None => return Err(primary_err),
            },
        };

        Ok(ReportSummary {
            generated_at: self.time_provider.now(),
            totals,
            source: source.to_string(),
        })
    }

    async fn write(&self, line: &str) {
        if let Err(e) = self.sink.append_line(line).await {
            error!(error = %e, path = self.sink.location(), "Error writing report log");
        }
    }
}

#[async_trait]
impl ScheduledJob for ReportJob {
    fn name(&self) -> &'static str {
        "report"
    }

    async fn run(&self) -> JobOutcome {
        match self.generate().await {
            Ok(summary) => {
                info!(
                    customers = summary.totals.total_customers,
                    orders = summary.totals.total_orders,
                    revenue = %summary.totals.total_revenue,
                    source = %summary.source,
                    "CRM report generated"
                );
                let line = summary.log_line();
                self.write(&line).await;
                JobOutcome::Completed(line)
            }
            Err(e) => {
                let message = format!("Error generating CRM report: {}", e);
                error!(error = %e, "CRM report failed");
                let line = format!(
                    "{} - ERROR: {}",
                    self.time_provider.now().format(LOG_TIMESTAMP_FORMAT),
                    message
                );
                self.write(&line).await;
                JobOutcome::Failed(message)
            }
        }
    }
}
