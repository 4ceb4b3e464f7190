//! RPC Method Handlers
//!
//! Implements the query and mutation logic for each JSON-RPC method.

use crate::error::to_rpc_error;
use crate::types::{
    CustomerListResponse, GetByIdRequest, HelloResponse, OrderListResponse, ProductListResponse,
};
use crm_core::application::RestockService;
use crm_core::domain::{
    Customer, CustomerFilter, OrderFilter, OrderRecord, Product, ProductFilter, RestockOutcome,
};
use crm_core::error::AppError;
use crm_core::port::crm_api::HELLO_GREETING;
use crm_core::port::{CustomerRepository, OrderRepository, ProductRepository};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    product_repo: Arc<dyn ProductRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    order_repo: Arc<dyn OrderRepository>,
    restock: Arc<RestockService>,
}

impl RpcHandler {
    pub fn new(
        product_repo: Arc<dyn ProductRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        order_repo: Arc<dyn OrderRepository>,
        restock: Arc<RestockService>,
    ) -> Self {
        Self {
            product_repo,
            customer_repo,
            order_repo,
            restock,
        }
    }

    /// crm.hello.v1
    pub async fn hello(&self) -> Result<HelloResponse, ErrorObjectOwned> {
        Ok(HelloResponse {
            hello: HELLO_GREETING.to_string(),
        })
    }

    /// products.list.v1
    pub async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<ProductListResponse, ErrorObjectOwned> {
        let products = self
            .product_repo
            .list(&filter)
            .await
            .map_err(to_rpc_error)?;
        debug!(count = products.len(), "products.list.v1");
        Ok(ProductListResponse { products })
    }

    /// products.get.v1
    pub async fn get_product(&self, req: GetByIdRequest) -> Result<Product, ErrorObjectOwned> {
        self.product_repo
            .find_by_id(req.id)
            .await
            .map_err(to_rpc_error)?
            .ok_or_else(|| to_rpc_error(AppError::NotFound(format!("Product {} not found", req.id))))
    }

    /// customers.list.v1
    pub async fn list_customers(
        &self,
        filter: CustomerFilter,
    ) -> Result<CustomerListResponse, ErrorObjectOwned> {
        let customers = self
            .customer_repo
            .list(&filter)
            .await
            .map_err(to_rpc_error)?;
        Ok(CustomerListResponse { customers })
    }

    /// customers.get.v1
    pub async fn get_customer(&self, req: GetByIdRequest) -> Result<Customer, ErrorObjectOwned> {
        self.customer_repo
            .find_by_id(req.id)
            .await
            .map_err(to_rpc_error)?
            .ok_or_else(|| {
                to_rpc_error(AppError::NotFound(format!("Customer {} not found", req.id)))
            })
    }

    /// orders.list.v1
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
    ) -> Result<OrderListResponse, ErrorObjectOwned> {
        if let (Some(gte), Some(lte)) = (filter.order_date_gte, filter.order_date_lte) {
            if gte > lte {
                return Err(to_rpc_error(AppError::Validation(format!(
                    "order_date_gte ({}) is after order_date_lte ({})",
                    gte, lte
                ))));
            }
        }

        let orders = self
            .order_repo
            .list_records(&filter)
            .await
            .map_err(to_rpc_error)?;
        debug!(count = orders.len(), "orders.list.v1");
        Ok(OrderListResponse { orders })
    }

    /// orders.get.v1
    pub async fn get_order(&self, req: GetByIdRequest) -> Result<OrderRecord, ErrorObjectOwned> {
        self.order_repo
            .find_record(req.id)
            .await
            .map_err(to_rpc_error)?
            .ok_or_else(|| to_rpc_error(AppError::NotFound(format!("Order {} not found", req.id))))
    }

    /// inventory.update_low_stock.v1
    ///
    /// Failures are reported in the payload (`success = false`), not as RPC errors.
    pub async fn update_low_stock_products(&self) -> Result<RestockOutcome, ErrorObjectOwned> {
        Ok(self.restock.update_low_stock_products().await)
    }
}
