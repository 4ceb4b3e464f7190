//! RPC Request/Response Types
//!
//! Method parameters and results. Entities are the core domain types;
//! these wrap them in named envelopes.

use crm_core::domain::{Customer, OrderRecord, Product};
use serde::{Deserialize, Serialize};

/// crm.hello.v1 - Health query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloResponse {
    pub hello: String,
}

/// *.get.v1 - Fetch one record by ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetByIdRequest {
    pub id: i64,
}

/// products.list.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

/// customers.list.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerListResponse {
    pub customers: Vec<Customer>,
}

/// orders.list.v1 - Orders with their customer nested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderRecord>,
}
