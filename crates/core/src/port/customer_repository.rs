// Customer Repository Port (Interface)

use crate::domain::{Customer, CustomerFilter, CustomerId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Customer reads
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Insert a customer, returning it with its assigned ID
    async fn insert(&self, name: &str, email: &str, phone: Option<&str>) -> Result<Customer>;

    /// Find customer by ID
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// List customers matching the filter, ordered by ID
    async fn list(&self, filter: &CustomerFilter) -> Result<Vec<Customer>>;

    /// Count all customers
    async fn count(&self) -> Result<i64>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// In-memory customer store
    #[derive(Clone, Default)]
    pub struct InMemoryCustomerRepository {
        customers: Arc<Mutex<Vec<Customer>>>,
        fail: bool,
    }

    impl InMemoryCustomerRepository {
        pub fn new(customers: Vec<Customer>) -> Self {
            Self {
                customers: Arc::new(Mutex::new(customers)),
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
                return Err(AppError::Database("customer store unavailable".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CustomerRepository for InMemoryCustomerRepository {
        async fn insert(&self, name: &str, email: &str, phone: Option<&str>) -> Result<Customer> {
            self.check()?;
            let mut customers = self.customers.lock().unwrap();
            let id = customers.iter().map(|c| c.id).max().unwrap_or(0) + 1;
            let mut customer = Customer::new(id, name, email);
            customer.phone = phone.map(str::to_string);
            customers.push(customer.clone());
            Ok(customer)
        }

        async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>> {
            self.check()?;
            let customers = self.customers.lock().unwrap();
            Ok(customers.iter().find(|c| c.id == id).cloned())
        }

        async fn list(&self, filter: &CustomerFilter) -> Result<Vec<Customer>> {
            self.check()?;
            let customers = self.customers.lock().unwrap();
            let contains = |haystack: &str, needle: &Option<String>| {
                needle
                    .as_ref()
                    .map(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
                    .unwrap_or(true)
            };
            Ok(customers
                .iter()
                .filter(|c| contains(&c.name, &filter.name_contains))
                .filter(|c| contains(&c.email, &filter.email_contains))
                .cloned()
                .collect())
        }

        async fn count(&self) -> Result<i64> {
            self.check()?;
            Ok(self.customers.lock().unwrap().len() as i64)
        }
    }
}
