//! CRM Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    CustomerListResponse, GetByIdRequest, HelloResponse, OrderListResponse, ProductListResponse,
};
use async_trait::async_trait;
use crm_core::application::constants::DEFAULT_API_TIMEOUT_SECS;
use crm_core::domain::{
    Customer, CustomerFilter, OrderFilter, OrderRecord, Product, ProductFilter, RestockOutcome,
};
use crm_core::port::CrmApi;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use std::time::Duration;
use tracing::debug;

/// CRM API Client
///
/// Every request is bounded by the configured timeout.
///
/// # Example
///
/// ```no_run
/// use crm_sdk::CrmClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CrmClient::connect("http://127.0.0.1:9527").await?;
/// println!("{}", client.hello().await?.hello);
/// # Ok(())
/// # }
/// ```
pub struct CrmClient {
    client: HttpClient,
    endpoint: String,
}

impl CrmClient {
    /// Connect with the default 5 second request timeout
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        Self::connect_with_timeout(url, Duration::from_secs(DEFAULT_API_TIMEOUT_SECS)).await
    }

    /// Connect with an explicit request timeout
    ///
    /// No request is sent here; an unreachable endpoint surfaces on the first call.
    pub async fn connect_with_timeout(url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(timeout)
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        debug!(endpoint = url, timeout_ms = timeout.as_millis() as u64, "CRM client ready");
        Ok(Self {
            client,
            endpoint: url.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// crm.hello.v1
    pub async fn hello(&self) -> Result<HelloResponse> {
        let response: HelloResponse = self.client.request("crm.hello.v1", rpc_params![]).await?;
        Ok(response)
    }

    /// products.list.v1
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let response: ProductListResponse = self
            .client
            .request("products.list.v1", rpc_params![filter])
            .await?;
        Ok(response.products)
    }

    /// products.get.v1
    pub async fn get_product(&self, id: i64) -> Result<Product> {
        let product: Product = self
            .client
            .request("products.get.v1", rpc_params![GetByIdRequest { id }])
            .await?;
        Ok(product)
    }

    /// customers.list.v1
    pub async fn list_customers(&self, filter: &CustomerFilter) -> Result<Vec<Customer>> {
        let response: CustomerListResponse = self
            .client
            .request("customers.list.v1", rpc_params![filter])
            .await?;
        Ok(response.customers)
    }

    /// customers.get.v1
    pub async fn get_customer(&self, id: i64) -> Result<Customer> {
        let customer: Customer = self
            .client
            .request("customers.get.v1", rpc_params![GetByIdRequest { id }])
            .await?;
        Ok(customer)
    }

    /// orders.list.v1
    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>> {
        let response: OrderListResponse = self
            .client
            .request("orders.list.v1", rpc_params![filter])
            .await?;
        Ok(response.orders)
    }

    /// orders.get.v1
    pub async fn get_order(&self, id: i64) -> Result<OrderRecord> {
        let order: OrderRecord = self
            .client
            .request("orders.get.v1", rpc_params![GetByIdRequest { id }])
            .await?;
        Ok(order)
    }

    /// inventory.update_low_stock.v1
    pub async fn update_low_stock_products(&self) -> Result<RestockOutcome> {
        let outcome: RestockOutcome = self
            .client
            .request("inventory.update_low_stock.v1", rpc_params![])
            .await?;
        Ok(outcome)
    }
}

#[async_trait]
impl CrmApi for CrmClient {
    async fn hello(&self) -> crm_core::Result<String> {
        Ok(CrmClient::hello(self).await?.hello)
    }

    async fn products(&self, filter: &ProductFilter) -> crm_core::Result<Vec<Product>> {
        Ok(self.list_products(filter).await?)
    }

    async fn customers(&self, filter: &CustomerFilter) -> crm_core::Result<Vec<Customer>> {
        Ok(self.list_customers(filter).await?)
    }

    async fn orders(&self, filter: &OrderFilter) -> crm_core::Result<Vec<OrderRecord>> {
        Ok(self.list_orders(filter).await?)
    }

    async fn update_low_stock_products(&self) -> crm_core::Result<RestockOutcome> {
        Ok(CrmClient::update_low_stock_products(self).await?)
    }
}
