// Report Domain Model
// Derived, never persisted: lives only as the log line it produces

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timestamp layout for report and reminder lines
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Aggregated CRM numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub total_customers: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
}

impl ReportTotals {
    pub fn new(total_customers: i64, total_orders: i64, total_revenue: Decimal) -> Self {
        Self {
            total_customers,
            total_orders,
            total_revenue,
        }
    }

    /// Sum amounts, counting missing ones as zero
    pub fn sum_amounts<I>(amounts: I) -> Decimal
    where
        I: IntoIterator<Item = Option<Decimal>>,
    {
        amounts.into_iter().flatten().sum()
    }
}

/// One report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub totals: ReportTotals,
    /// Name of the strategy that produced the numbers
    pub source: String,
}

impl ReportSummary {
    pub fn log_line(&self) -> String {
        format!(
            "{} - Report: {} customers, {} orders, {:.2} revenue.",
            self.generated_at.format(REPORT_TIMESTAMP_FORMAT),
            self.totals.total_customers,
            self.totals.total_orders,
            self.totals.total_revenue.round_dp(2),
        )
    }
}
