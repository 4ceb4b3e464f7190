//! CRM Automation Daemon - Main Entry Point
//! Query API server + scheduled heartbeat, restock, report and reminder jobs

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

// Import workspace crates
use crm_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use crm_core::application::{
    shutdown_channel, DirectStoreStrategy, HeartbeatJob, JobRunner, QueryLayerStrategy,
    ReminderJob, ReportJob, RestockJob, RestockService,
};
use crm_core::port::time_provider::SystemTimeProvider;
use crm_core::port::{CrmApi, CustomerRepository, OrderRepository, TimeProvider};
use crm_infra_sqlite::{
    create_pool, run_migrations, SqliteCustomerRepository, SqliteOrderRepository,
    SqliteProductRepository,
};
use crm_infra_system::{CrmSettings, FileLogSink};
use crm_sdk::CrmClient;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LOG_FORMAT_ENV: &str = "CRM_LOG_FORMAT";
const DEFAULT_LOG_FILTER: &str = "info";
const DIAGNOSTIC_LOG_FILE: &str = "crm.log";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (before logging: the diagnostic log dir comes from it)
    let settings = CrmSettings::load().context("Failed to load settings")?;

    // 2. Initialize logging (stderr + diagnostic file)
    let _log_guard = init_logging(&settings.logging_dir());

    info!("CRM automation v{} starting...", VERSION);

    // 3. Initialize database
    ensure_db_dir(&settings.database.url)?;
    info!(database = %settings.database.url, "Initializing database...");
    let pool = create_pool(&settings.database.url)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Setup dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let product_repo = Arc::new(SqliteProductRepository::new(pool.clone()));
    let customer_repo: Arc<dyn CustomerRepository> =
        Arc::new(SqliteCustomerRepository::new(pool.clone()));
    let order_repo: Arc<dyn OrderRepository> = Arc::new(SqliteOrderRepository::new(pool.clone()));

    let restock_policy = settings.restock_policy()?;
    let restock_service = Arc::new(RestockService::new(product_repo.clone(), restock_policy));

    // 5. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        host: settings.rpc.host.clone(),
        port: settings.rpc.port,
    };
    let handler = RpcHandler::new(
        product_repo.clone(),
        customer_repo.clone(),
        order_repo.clone(),
        restock_service.clone(),
    );
    let (rpc_addr, rpc_handle) = RpcServer::new(rpc_config, handler)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 6. Query API client used by the jobs
    let api: Arc<dyn CrmApi> = Arc::new(
        CrmClient::connect_with_timeout(&settings.api.endpoint, settings.api_timeout())
            .await
            .context("API client setup failed")?,
    );

    // 7. Register scheduled jobs
    let schedules = settings.jobs.resolve()?;
    let mut runner = JobRunner::new(time_provider.clone());

    let heartbeat_api = settings.heartbeat.probe.then(|| api.clone());
    runner.register(
        schedules.heartbeat,
        Arc::new(HeartbeatJob::new(
            heartbeat_api,
            Arc::new(FileLogSink::new(&settings.logs.heartbeat)),
            time_provider.clone(),
        )),
    );

    runner.register(
        schedules.restock,
        Arc::new(RestockJob::new(
            restock_service,
            Arc::new(FileLogSink::new(&settings.logs.restock)),
            time_provider.clone(),
        )),
    );

    runner.register(
        schedules.report,
        Arc::new(ReportJob::new(
            Arc::new(QueryLayerStrategy::new(api.clone())),
            Some(Arc::new(DirectStoreStrategy::new(customer_repo, order_repo))),
            Arc::new(FileLogSink::new(&settings.logs.report)),
            time_provider.clone(),
        )),
    );

    if settings.reminders.enabled {
        runner.register(
            schedules.reminders,
            Arc::new(ReminderJob::new(
                api.clone(),
                Arc::new(FileLogSink::new(&settings.logs.reminders)),
                time_provider.clone(),
                settings.reminders.days,
            )),
        );
    } else {
        info!("Order reminders disabled");
    }

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    info!(jobs = ?runner.job_names(), "Starting job runner...");
    let job_handles = runner.spawn(shutdown_rx);

    info!(rpc = %rpc_addr, "System ready");
    info!("Press Ctrl+C to shutdown");

    // 8. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 9. Graceful shutdown: schedulers stop between runs
    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    for handle in job_handles {
        if tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .is_err()
        {
            warn!("Job loop did not stop within 5s");
        }
    }

    info!("Shutdown complete.");

    Ok(())
}

/// Console layer on stderr plus a non-blocking diagnostic file in `log_dir`
///
/// `CRM_LOG_FORMAT=json` switches both to JSON lines. The returned guard
/// must live until exit so buffered file lines are flushed.
fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
    }

    let guard = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(log_dir, DIAGNOSTIC_LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            if json {
                layers.push(fmt::layer().json().with_writer(writer).boxed());
            } else {
                layers.push(fmt::layer().with_ansi(false).with_writer(writer).boxed());
            }
            Some(guard)
        }
        Err(e) => {
            eprintln!(
                "Warning: cannot create log directory {}: {} (file logging disabled)",
                log_dir.display(),
                e
            );
            None
        }
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    guard
}

/// File-backed databases need their directory to exist
fn ensure_db_dir(url: &str) -> Result<()> {
    if url.starts_with("sqlite:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
