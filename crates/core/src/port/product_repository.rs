// Product Repository Port (Interface)

use crate::domain::{Product, ProductFilter, ProductId};
use crate::error::Result;
use crate::port::transaction::Transaction;
use async_trait::async_trait;

/// Repository interface for Product reads and inserts
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product, returning it with its assigned ID
    async fn insert(&self, name: &str, stock: i64) -> Result<Product>;

    /// Find product by ID
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    /// List products matching the filter, ordered by ID
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>>;
}

/// Transactional Product operations
#[async_trait]
pub trait TransactionalProductRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn ProductRepositoryTransaction>>;
}

/// Product operations within a transaction
#[async_trait]
pub trait ProductRepositoryTransaction: Transaction {
    /// Products with stock strictly below `threshold` (within transaction)
    async fn find_low_stock(&mut self, threshold: i64) -> Result<Vec<Product>>;

    /// Add `increment` to a product's stock if it is still below `threshold`
    ///
    /// Returns the updated product, or None when the guard no longer holds
    /// (another run already restocked it).
    async fn increment_stock(
        &mut self,
        id: ProductId,
        increment: i64,
        threshold: i64,
    ) -> Result<Option<Product>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct State {
        products: Vec<Product>,
        commits: usize,
        rollbacks: usize,
    }

    /// In-memory product store with an optional injected failure
    #[derive(Clone, Default)]
    pub struct InMemoryProductRepository {
        state: Arc<Mutex<State>>,
        /// Fail the Nth increment (1-based) inside a transaction
        fail_on_increment: Option<usize>,
    }

    impl InMemoryProductRepository {
        pub fn new(products: Vec<Product>) -> Self {
            Self {
                state: Arc::new(Mutex::new(State {
                    products,
                    ..Default::default()
                })),
                fail_on_increment: None,
            }
        }

        pub fn failing_on_increment(mut self, nth: usize) -> Self {
            self.fail_on_increment = Some(nth);
            self
        }

        pub fn snapshot(&self) -> Vec<Product> {
            self.state.lock().unwrap().products.clone()
        }

        pub fn commits(&self) -> usize {
            self.state.lock().unwrap().commits
        }

        pub fn rollbacks(&self) -> usize {
            self.state.lock().unwrap().rollbacks
        }
    }

    #[async_trait]
    impl ProductRepository for InMemoryProductRepository {
        async fn insert(&self, name: &str, stock: i64) -> Result<Product> {
            let mut state = self.state.lock().unwrap();
            let id = state.products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
            let product = Product::new(id, name, stock);
            state.products.push(product.clone());
            Ok(product)
        }

        async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
            let state = self.state.lock().unwrap();
            Ok(state.products.iter().find(|p| p.id == id).cloned())
        }

        async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .products
                .iter()
                .filter(|p| filter.matches(p))
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl TransactionalProductRepository for InMemoryProductRepository {
        async fn begin_transaction(&self) -> Result<Box<dyn ProductRepositoryTransaction>> {
            let working = self.state.lock().unwrap().products.clone();
            Ok(Box::new(InMemoryProductTransaction {
                state: Arc::clone(&self.state),
                working,
                increments: 0,
                fail_on_increment: self.fail_on_increment,
            }))
        }
    }

    /// Works on a private copy; commit publishes it
    pub struct InMemoryProductTransaction {
        state: Arc<Mutex<State>>,
        working: Vec<Product>,
        increments: usize,
        fail_on_increment: Option<usize>,
    }

    #[async_trait]
    impl Transaction for InMemoryProductTransaction {
        async fn commit(self: Box<Self>) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.products = self.working;
            state.commits += 1;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            self.state.lock().unwrap().rollbacks += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl ProductRepositoryTransaction for InMemoryProductTransaction {
        async fn find_low_stock(&mut self, threshold: i64) -> Result<Vec<Product>> {
            Ok(self
                .working
                .iter()
                .filter(|p| p.is_low_stock(threshold))
                .cloned()
                .collect())
        }

        async fn increment_stock(
            &mut self,
            id: ProductId,
            increment: i64,
            threshold: i64,
        ) -> Result<Option<Product>> {
            self.increments += 1;
            if self.fail_on_increment == Some(self.increments) {
                return Err(AppError::Database("simulated write failure".to_string()));
            }
            match self
                .working
                .iter_mut()
                .find(|p| p.id == id && p.is_low_stock(threshold))
            {
                Some(product) => {
                    product.stock += increment;
                    Ok(Some(product.clone()))
                }
                None => Ok(None),
            }
        }
    }
}
