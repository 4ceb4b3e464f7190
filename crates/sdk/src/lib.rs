//! CRM SDK - Rust Client Library
//!
//! Typed client for the CRM automation JSON-RPC API. `CrmClient` also
//! implements the core `CrmApi` port, so the scheduled jobs can run against
//! a live endpoint.
//!
//! # Example
//!
//! ```no_run
//! use crm_sdk::CrmClient;
//! use crm_core::domain::ProductFilter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CrmClient::connect("http://127.0.0.1:9527").await?;
//!
//!     let low = client.list_products(&ProductFilter::low_stock(10)).await?;
//!     println!("{} products low on stock", low.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::CrmClient;
pub use error::{Result, SdkError};
pub use types::{
    CustomerListResponse, GetByIdRequest, HelloResponse, OrderListResponse, ProductListResponse,
};
