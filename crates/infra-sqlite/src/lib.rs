// CRM Infrastructure - SQLite Adapter
// Implements: ProductRepository, TransactionalProductRepository, CustomerRepository, OrderRepository

mod amount;
mod connection;
mod customer_repository;
mod error;
mod migration;
mod order_repository;
mod product_repository;
mod transaction;

pub use connection::create_pool;
pub use customer_repository::SqliteCustomerRepository;
pub use migration::run_migrations;
pub use order_repository::SqliteOrderRepository;
pub use product_repository::SqliteProductRepository;
pub use transaction::SqliteProductTransaction;

// Note: sqlx::Error conversion is handled by `error::map_sqlx_error`
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
