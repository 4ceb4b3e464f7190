// Order Repository Port (Interface)

use crate::domain::{CustomerId, Order, OrderFilter, OrderId, OrderRecord, OrderStatus};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Repository interface for Order reads and aggregates
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order, returning it with its assigned ID
    async fn insert(
        &self,
        customer_id: CustomerId,
        order_date: DateTime<Utc>,
        total_amount: Option<Decimal>,
        status: OrderStatus,
    ) -> Result<Order>;

    /// Find an order with its customer resolved
    async fn find_record(&self, id: OrderId) -> Result<Option<OrderRecord>>;

    /// List orders matching the filter with customers resolved, oldest first
    async fn list_records(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>>;

    /// Count all orders
    async fn count(&self) -> Result<i64>;

    /// Sum of all order amounts (missing amounts count as zero)
    async fn revenue_sum(&self) -> Result<Decimal>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{Customer, ReportTotals};
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// In-memory order store; customers are resolved from a fixed list
    #[derive(Clone, Default)]
    pub struct InMemoryOrderRepository {
        orders: Arc<Mutex<Vec<Order>>>,
        customers: Vec<Customer>,
        fail: bool,
    }

    impl InMemoryOrderRepository {
        pub fn new(orders: Vec<Order>, customers: Vec<Customer>) -> Self {
            Self {
                orders: Arc::new(Mutex::new(orders)),
                customers,
                fail: false,
            }
        }

        /// Every call returns a database error
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn check(&self) -> Result<()> {
            if self.fail {
                return Err(AppError::Database("order store unavailable".to_string()));
            }
            Ok(())
        }

        fn record(&self, order: &Order) -> OrderRecord {
            let customer = self.customers.iter().find(|c| c.id == order.customer_id);
            OrderRecord::from_parts(order, customer)
        }
    }

    fn matches(filter: &OrderFilter, order: &Order) -> bool {
        filter.customer_id.map_or(true, |id| order.customer_id == id)
            && filter.status.map_or(true, |s| order.status == s)
            && filter.order_date_gte.map_or(true, |d| order.order_date >= d)
            && filter.order_date_lte.map_or(true, |d| order.order_date <= d)
    }

    #[async_trait]
    impl OrderRepository for InMemoryOrderRepository {
        async fn insert(
            &self,
            customer_id: CustomerId,
            order_date: DateTime<Utc>,
            total_amount: Option<Decimal>,
            status: OrderStatus,
        ) -> Result<Order> {
            self.check()?;
            let mut orders = self.orders.lock().unwrap();
            let id = orders.iter().map(|o| o.id).max().unwrap_or(0) + 1;
            let mut order = Order::new(id, customer_id, order_date, total_amount);
            order.status = status;
            orders.push(order.clone());
            Ok(order)
        }

        async fn find_record(&self, id: OrderId) -> Result<Option<OrderRecord>> {
            self.check()?;
            let orders = self.orders.lock().unwrap();
            Ok(orders.iter().find(|o| o.id == id).map(|o| self.record(o)))
        }

        async fn list_records(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>> {
            self.check()?;
            let orders = self.orders.lock().unwrap();
            Ok(orders
                .iter()
                .filter(|o| matches(filter, o))
                .map(|o| self.record(o))
                .collect())
        }

        async fn count(&self) -> Result<i64> {
            self.check()?;
            Ok(self.orders.lock().unwrap().len() as i64)
        }

        async fn revenue_sum(&self) -> Result<Decimal> {
            self.check()?;
            let orders = self.orders.lock().unwrap();
            Ok(ReportTotals::sum_amounts(
                orders.iter().map(|o| o.total_amount),
            ))
        }
    }
}
