//! JSON-RPC Server
//!
//! Serves the CRM query/mutation API over HTTP on localhost.

use crate::handler::RpcHandler;
use crate::types::GetByIdRequest;
use crm_core::domain::{CustomerFilter, OrderFilter, ProductFilter};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Build the method table
    ///
    /// List methods take an optional positional filter; `*.get.v1` take `{id}`.
    pub fn into_module(self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method("crm.hello.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.hello().await }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("products.list.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let filter: Option<ProductFilter> = params.sequence().optional_next()?;
                    handler.list_products(filter.unwrap_or_default()).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("products.get.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: GetByIdRequest = params.one()?;
                    handler.get_product(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("customers.list.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let filter: Option<CustomerFilter> = params.sequence().optional_next()?;
                    handler.list_customers(filter.unwrap_or_default()).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("customers.get.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: GetByIdRequest = params.one()?;
                    handler.get_customer(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("orders.list.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let filter: Option<OrderFilter> = params.sequence().optional_next()?;
                    handler.list_orders(filter.unwrap_or_default()).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("orders.get.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: GetByIdRequest = params.one()?;
                    handler.get_order(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Mutation
        let handler = self.handler.clone();
        module
            .register_async_method("inventory.update_low_stock.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.update_low_stock_products().await }
            })
            .map_err(|e| e.to_string())?;

        Ok(module)
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the stop handle.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.into_module()?;
        let handle = server.start(module);

        info!(addr = %local_addr, "JSON-RPC server started successfully");
        Ok((local_addr, handle))
    }
}
