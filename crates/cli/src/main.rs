//! CRM CLI - run the automation jobs once and inspect CRM records

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{Table, Tabled};

use crm_core::application::{
    DirectStoreStrategy, HeartbeatJob, QueryLayerStrategy, ReminderJob, ReminderRun, ReportJob,
    RestockJob, RestockService, ScheduledJob,
};
use crm_core::domain::{
    Customer, CustomerFilter, OrderFilter, OrderRecord, OrderStatus, Product, ProductFilter,
};
use crm_core::port::time_provider::SystemTimeProvider;
use crm_core::port::{CrmApi, TimeProvider};
use crm_infra_sqlite::{
    create_pool, run_migrations, SqliteCustomerRepository, SqliteOrderRepository,
    SqliteProductRepository,
};
use crm_infra_system::{CrmSettings, FileLogSink};
use crm_sdk::CrmClient;

#[derive(Parser)]
#[command(name = "crm")]
#[command(about = "CRM automation CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Query API URL (overrides api.endpoint)
    #[arg(long, env = "CRM_RPC_URL")]
    rpc_url: Option<String>,

    /// Settings file
    #[arg(long, env = "CRM_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Append one heartbeat line
    Heartbeat {
        /// Skip the query endpoint probe
        #[arg(long)]
        no_probe: bool,
    },

    /// Restock low-stock products and log the result
    Restock,

    /// Generate the CRM report line
    Report,

    /// Log reminders for recent orders
    Remind {
        /// Look-back window in days (default: reminders.days)
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Probe the query endpoint
    Hello,

    /// List products
    Products {
        /// Only products with stock below this value
        #[arg(long)]
        below: Option<i64>,

        /// Name substring
        #[arg(long)]
        name: Option<String>,
    },

    /// List customers
    Customers {
        /// Name substring
        #[arg(long)]
        name: Option<String>,

        /// Email substring
        #[arg(long)]
        email: Option<String>,
    },

    /// List orders
    Orders {
        /// Orders on or after this date (YYYY-MM-DD, UTC)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Customer ID
        #[arg(long)]
        customer: Option<i64>,

        /// Status (PENDING, SHIPPED, ...)
        #[arg(long)]
        status: Option<OrderStatus>,
    },

    /// Send a raw JSON-RPC request
    Call {
        /// Method name (e.g., orders.list.v1)
        method: String,

        /// Params as JSON string
        #[arg(default_value = "[]")]
        params: String,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Tabled)]
struct ProductRow {
    id: i64,
    name: String,
    stock: i64,
    price: String,
}

impl From<Product> for ProductRow {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            stock: p.stock,
            price: p.price.map(|v| format!("{:.2}", v)).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct CustomerRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
}

impl From<Customer> for CustomerRow {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone.unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct OrderRow {
    id: String,
    date: String,
    customer: String,
    amount: String,
    status: String,
}

impl From<OrderRecord> for OrderRow {
    fn from(o: OrderRecord) -> Self {
        let customer = o.customer_email().unwrap_or("-").to_string();
        Self {
            id: o.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            date: o
                .order_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            customer,
            amount: o
                .total_amount
                .map(|v| format!("{:.2}", v))
                .unwrap_or_default(),
            status: o.status.map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

/// Settings plus the resolved endpoint for this invocation
struct Session {
    settings: CrmSettings,
    endpoint: String,
    time_provider: Arc<dyn TimeProvider>,
}

/// Direct store access (restock and the report fallback)
struct Store {
    products: Arc<SqliteProductRepository>,
    customers: Arc<SqliteCustomerRepository>,
    orders: Arc<SqliteOrderRepository>,
}

impl Session {
    fn load(cli: &Cli) -> Result<Self> {
        let settings =
            CrmSettings::load_from(cli.config.as_deref()).context("Failed to load settings")?;
        let endpoint = cli
            .rpc_url
            .clone()
            .unwrap_or_else(|| settings.api.endpoint.clone());
        Ok(Self {
            settings,
            endpoint,
            time_provider: Arc::new(SystemTimeProvider),
        })
    }

    async fn api(&self) -> Result<Arc<dyn CrmApi>> {
        let client = CrmClient::connect_with_timeout(&self.endpoint, self.settings.api_timeout())
            .await
            .context("Failed to create API client")?;
        Ok(Arc::new(client))
    }

    async fn store(&self) -> Result<Store> {
        let url = &self.settings.database.url;
        if !url.starts_with("sqlite:") {
            if let Some(parent) = Path::new(url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
            }
        }
        let pool = create_pool(url).await.context("Failed to open database")?;
        run_migrations(&pool).await.context("Migration failed")?;

        Ok(Store {
            products: Arc::new(SqliteProductRepository::new(pool.clone())),
            customers: Arc::new(SqliteCustomerRepository::new(pool.clone())),
            orders: Arc::new(SqliteOrderRepository::new(pool)),
        })
    }

    fn sink(&self, path: &str) -> Arc<FileLogSink> {
        Arc::new(FileLogSink::new(path))
    }
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to CRM endpoint")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let session = Session::load(&cli)?;

    match cli.command {
        Commands::Heartbeat { no_probe } => {
            let api = if no_probe || !session.settings.heartbeat.probe {
                None
            } else {
                Some(session.api().await?)
            };
            let job = HeartbeatJob::new(
                api,
                session.sink(&session.settings.logs.heartbeat),
                session.time_provider.clone(),
            );

            let outcome = job.run().await;
            if outcome.is_success() {
                println!("{}", outcome.message());
            } else {
                println!("{} {}", "✗".red(), outcome.message());
            }
        }

        Commands::Restock => {
            let store = session.store().await?;
            let service = Arc::new(RestockService::new(
                store.products,
                session.settings.restock_policy()?,
            ));
            let job = RestockJob::new(
                service,
                session.sink(&session.settings.logs.restock),
                session.time_provider.clone(),
            );

            let outcome = job.run().await;
            if !outcome.is_success() {
                anyhow::bail!("Restock failed: {}", outcome.message());
            }
            println!("{}", format!("✓ {}", outcome.message()).green().bold());
        }

        Commands::Report => {
            let store = session.store().await?;
            let job = ReportJob::new(
                Arc::new(QueryLayerStrategy::new(session.api().await?)),
                Some(Arc::new(DirectStoreStrategy::new(
                    store.customers,
                    store.orders,
                ))),
                session.sink(&session.settings.logs.report),
                session.time_provider.clone(),
            );

            let outcome = job.run().await;
            if !outcome.is_success() {
                anyhow::bail!("{}", outcome.message());
            }
            println!("{}", outcome.message());
        }

        Commands::Remind { days } => {
            let job = ReminderJob::new(
                session.api().await?,
                session.sink(&session.settings.logs.reminders),
                session.time_provider.clone(),
                days.unwrap_or(session.settings.reminders.days),
            );

            let run = job
                .process()
                .await
                .context("Error querying orders")?;

            let report = RemindReport::new(&job, &run);
            for warning in &report.warnings {
                println!("{} {}", "Warning:".yellow(), warning);
            }
            if report.processed {
                println!("{}", report.summary.green().bold());
            } else {
                println!("{}", report.summary);
            }
        }

        Commands::Hello => {
            let api = session.api().await?;
            match api.hello().await {
                Ok(greeting) => {
                    println!("  {} {}", "Endpoint:".bold(), session.endpoint);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!("  {} {}", "Hello:".bold(), greeting);
                }
                Err(e) => {
                    println!("  {} {}", "Endpoint:".bold(), session.endpoint);
                    println!("  {} {}", "Status:".bold(), "UNREACHABLE".red());
                    anyhow::bail!(e);
                }
            }
        }

        Commands::Products { below, name } => {
            let filter = ProductFilter {
                name_contains: name,
                stock_lt: below,
                ..Default::default()
            };
            let products = session.api().await?.products(&filter).await?;
            print_table(products.into_iter().map(ProductRow::from).collect());
        }

        Commands::Customers { name, email } => {
            let filter = CustomerFilter {
                name_contains: name,
                email_contains: email,
            };
            let customers = session.api().await?.customers(&filter).await?;
            print_table(customers.into_iter().map(CustomerRow::from).collect());
        }

        Commands::Orders {
            since,
            customer,
            status,
        } => {
            let filter = OrderFilter {
                customer_id: customer,
                status,
                order_date_gte: since.map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc()),
                order_date_lte: None,
            };
            let orders = session.api().await?.orders(&filter).await?;
            print_table(orders.into_iter().map(OrderRow::from).collect());
        }

        Commands::Call { method, params } => {
            let params: serde_json::Value =
                serde_json::from_str(&params).context("Invalid JSON params")?;
            let result = call_rpc(&session.endpoint, &method, params).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// What `crm remind` prints for one run
#[derive(Debug)]
struct RemindReport {
    warnings: Vec<String>,
    summary: String,
    /// Zero matching orders ends the run at the summary
    processed: bool,
}

impl RemindReport {
    fn new(job: &ReminderJob, run: &ReminderRun) -> Self {
        let warnings = run
            .skipped
            .iter()
            .map(|id| {
                let id = id.map(|id| id.to_string()).unwrap_or_else(|| "?".into());
                format!("Order {} has no customer email, skipping", id)
            })
            .collect();
        Self {
            warnings,
            summary: job.summary(run),
            processed: run.found > 0,
        }
    }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No records".yellow());
        return;
    }
    let count = rows.len();
    println!("{}", Table::new(rows));
    println!("{} record(s)", count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crm_core::domain::CustomerRef;
    use crm_core::port::crm_api::mocks::StaticCrmApi;
    use crm_core::port::log_sink::mocks::MemoryLogSink;
    use crm_core::port::time_provider::FixedTimeProvider;

    fn reminder_job(api: StaticCrmApi) -> ReminderJob {
        ReminderJob::new(
            Arc::new(api),
            Arc::new(MemoryLogSink::new()),
            Arc::new(FixedTimeProvider::new(
                Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap(),
            )),
            7,
        )
    }

    fn order(id: i64, email: Option<&str>) -> OrderRecord {
        OrderRecord {
            id: Some(id),
            customer: Some(CustomerRef {
                id: Some(1),
                name: Some("Alice".to_string()),
                email: email.map(str::to_string),
            }),
            order_date: Some(Utc.with_ymd_and_hms(2025, 6, 9, 12, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_orders_stops_at_summary() {
        let job = reminder_job(StaticCrmApi::new());
        let run = job.process().await.unwrap();

        let report = RemindReport::new(&job, &run);

        assert_eq!(report.summary, "No pending orders found within the last 7 days.");
        assert!(!report.processed);
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_processed_run_warns_about_skipped_orders() {
        let job = reminder_job(
            StaticCrmApi::new().with_orders(vec![order(1, Some("a@example.com")), order(2, None)]),
        );
        let run = job.process().await.unwrap();

        let report = RemindReport::new(&job, &run);

        assert!(report.processed);
        assert_eq!(
            report.warnings,
            vec!["Order 2 has no customer email, skipping".to_string()]
        );
        assert_eq!(report.summary, "Order reminders processed! 1 logged, 1 skipped");
    }
}
