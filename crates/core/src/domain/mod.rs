// Domain Layer - Pure business entities

pub mod customer;
pub mod error;
pub mod order;
pub mod product;
pub mod report;

// Re-exports
pub use customer::{Customer, CustomerFilter, CustomerId};
pub use error::DomainError;
pub use order::{CustomerRef, Order, OrderFilter, OrderId, OrderRecord, OrderStatus};
pub use product::{Product, ProductFilter, ProductId, RestockOutcome, RestockPolicy};
pub use report::{ReportSummary, ReportTotals};
