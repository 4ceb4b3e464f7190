// Port Layer - Interfaces for external dependencies

pub mod crm_api;
pub mod customer_repository;
pub mod log_sink;
pub mod order_repository;
pub mod product_repository;
pub mod time_provider; // For deterministic testing
pub mod transaction;

// Re-exports
pub use crm_api::CrmApi;
pub use customer_repository::CustomerRepository;
pub use log_sink::LogSink;
pub use order_repository::OrderRepository;
pub use product_repository::{
    ProductRepository, ProductRepositoryTransaction, TransactionalProductRepository,
};
pub use time_provider::TimeProvider;
pub use transaction::Transaction;
