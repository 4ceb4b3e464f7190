//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC envelopes from the api-rpc crate.

use crm_core::domain::{Customer, OrderRecord, Product};
use serde::{Deserialize, Serialize};

/// Response from crm.hello.v1
#[derive(Debug, Clone, Deserialize)]
pub struct HelloResponse {
    pub hello: String,
}

/// Parameter for the *.get.v1 methods
#[derive(Debug, Clone, Serialize)]
pub struct GetByIdRequest {
    pub id: i64,
}

/// Response from products.list.v1
#[derive(Debug, Clone, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

/// Response from customers.list.v1
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerListResponse {
    pub customers: Vec<Customer>,
}

/// Response from orders.list.v1
#[derive(Debug, Clone, Deserialize)]
pub struct OrderListResponse {
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
}
