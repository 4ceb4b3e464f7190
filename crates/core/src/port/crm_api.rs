// CRM Query API Port
// Client side of the query/mutation layer (network call in production)

use crate::domain::{
    Customer, CustomerFilter, OrderFilter, OrderRecord, Product, ProductFilter, RestockOutcome,
};
use crate::error::Result;
use async_trait::async_trait;

/// Greeting returned by the health query
pub const HELLO_GREETING: &str = "Hello World!";

/// Typed access to the query/mutation layer
///
/// Transport failures and error responses both surface as `AppError::Query`.
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// No-argument health query
    async fn hello(&self) -> Result<String>;

    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

    async fn customers(&self, filter: &CustomerFilter) -> Result<Vec<Customer>>;

    async fn orders(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>>;

    /// Restock mutation
    async fn update_low_stock_products(&self) -> Result<RestockOutcome>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Serves fixed data; optionally fails every call
    #[derive(Clone, Default)]
    pub struct StaticCrmApi {
        pub products: Vec<Product>,
        pub customers: Vec<Customer>,
        pub orders: Vec<OrderRecord>,
        failure: Option<String>,
        last_order_filter: Arc<Mutex<Option<OrderFilter>>>,
    }

    impl StaticCrmApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_customers(mut self, customers: Vec<Customer>) -> Self {
            self.customers = customers;
            self
        }

        pub fn with_orders(mut self, orders: Vec<OrderRecord>) -> Self {
            self.orders = orders;
            self
        }

        /// Every call returns `AppError::Query(message)`
        pub fn unreachable(message: impl Into<String>) -> Self {
            Self {
                failure: Some(message.into()),
                ..Default::default()
            }
        }

        pub fn last_order_filter(&self) -> Option<OrderFilter> {
            self.last_order_filter.lock().unwrap().clone()
        }

        fn check(&self) -> Result<()> {
            match &self.failure {
                Some(message) => Err(AppError::Query(message.clone())),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl CrmApi for StaticCrmApi {
        async fn hello(&self) -> Result<String> {
            self.check()?;
            Ok(HELLO_GREETING.to_string())
        }

        async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
            self.check()?;
            Ok(self
                .products
                .iter()
                .filter(|p| filter.matches(p))
                .cloned()
                .collect())
        }

        async fn customers(&self, _filter: &CustomerFilter) -> Result<Vec<Customer>> {
            self.check()?;
            Ok(self.customers.clone())
        }

        async fn orders(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>> {
            self.check()?;
            *self.last_order_filter.lock().unwrap() = Some(filter.clone());
            Ok(self
                .orders
                .iter()
                .filter(|o| match (filter.order_date_gte, o.order_date) {
                    (Some(cutoff), Some(date)) => date >= cutoff,
                    _ => true,
                })
                .cloned()
                .collect())
        }

        async fn update_low_stock_products(&self) -> Result<RestockOutcome> {
            self.check()?;
            Ok(RestockOutcome::succeeded(Vec::new()))
        }
    }
}
