//! Shared fixture: seeded SQLite file + JSON-RPC server on an ephemeral port

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use crm_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use crm_core::application::RestockService;
use crm_core::domain::{OrderStatus, RestockPolicy};
use crm_core::port::{CustomerRepository, OrderRepository, ProductRepository};
use crm_infra_sqlite::{
    create_pool, run_migrations, SqliteCustomerRepository, SqliteOrderRepository,
    SqliteProductRepository,
};
use crm_sdk::CrmClient;
use jsonrpsee::server::ServerHandle;
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;

pub struct Stack {
    pub dir: TempDir,
    pub products: Arc<SqliteProductRepository>,
    pub customers: Arc<SqliteCustomerRepository>,
    pub orders: Arc<SqliteOrderRepository>,
    pub restock: Arc<RestockService>,
    pub addr: SocketAddr,
    _server: ServerHandle,
}

impl Stack {
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn client(&self) -> CrmClient {
        CrmClient::connect(self.endpoint()).await.unwrap()
    }

    pub fn log_path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }
}

/// Instant the job tests run at
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap()
}

/// Products: Laptop 3, Mouse 9, Keyboard 10, Monitor 42
/// Customers: Alice, Bob
/// Orders: 10.50 on 06-09, 0.00 on 06-03 00:00, no amount on 06-02 23:59
pub async fn start_stack() -> Stack {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crm.db");
    let pool = create_pool(db_path.to_str().unwrap()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let products = Arc::new(SqliteProductRepository::new(pool.clone()));
    let customers = Arc::new(SqliteCustomerRepository::new(pool.clone()));
    let orders = Arc::new(SqliteOrderRepository::new(pool));

    for (name, stock) in [("Laptop", 3), ("Mouse", 9), ("Keyboard", 10), ("Monitor", 42)] {
        products.insert(name, stock).await.unwrap();
    }
    let alice = customers
        .insert("Alice", "alice@example.com", Some("+1-555-0100"))
        .await
        .unwrap();
    let bob = customers.insert("Bob", "bob@example.com", None).await.unwrap();

    orders
        .insert(
            alice.id,
            Utc.with_ymd_and_hms(2025, 6, 9, 15, 30, 0).unwrap(),
            Some(Decimal::new(1050, 2)),
            OrderStatus::Pending,
        )
        .await
        .unwrap();
    orders
        .insert(
            bob.id,
            Utc.with_ymd_and_hms(2025, 6, 3, 0, 0, 0).unwrap(),
            Some(Decimal::ZERO),
            OrderStatus::Shipped,
        )
        .await
        .unwrap();
    orders
        .insert(
            alice.id,
            Utc.with_ymd_and_hms(2025, 6, 2, 23, 59, 59).unwrap(),
            None,
            OrderStatus::Delivered,
        )
        .await
        .unwrap();

    let restock = Arc::new(RestockService::new(products.clone(), RestockPolicy::default()));
    let handler = RpcHandler::new(
        products.clone(),
        customers.clone(),
        orders.clone(),
        restock.clone(),
    );
    let config = RpcServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let (addr, server) = RpcServer::new(config, handler).start().await.unwrap();

    Stack {
        dir,
        products,
        customers,
        orders,
        restock,
        addr,
        _server: server,
    }
}

pub fn read_lines(path: &str) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
