// Low-Stock Restock Use Case

use crate::application::constants::LOG_TIMESTAMP_FORMAT;
use crate::application::jobs::{JobOutcome, ScheduledJob};
use crate::domain::{Product, RestockOutcome, RestockPolicy};
use crate::error::Result;
use crate::port::{LogSink, ProductRepositoryTransaction, TimeProvider, TransactionalProductRepository};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Raises every low-stock product by a fixed increment, all-or-nothing
pub struct RestockService {
    product_repo: Arc<dyn TransactionalProductRepository>,
    policy: RestockPolicy,
}

impl RestockService {
    pub fn new(product_repo: Arc<dyn TransactionalProductRepository>, policy: RestockPolicy) -> Self {
        Self {
            product_repo,
            policy,
        }
    }

    /// Run the restock mutation
    ///
    /// Never returns an error: failures roll the batch back and are
    /// reported through `success = false` and the message.
    pub async fn update_low_stock_products(&self) -> RestockOutcome {
        match self.restock_in_transaction().await {
            Ok(updated) => {
                info!(
                    updated_count = updated.len(),
                    threshold = self.policy.threshold,
                    increment = self.policy.increment,
                    "Low-stock products restocked"
                );
                RestockOutcome::succeeded(updated)
            }
            Err(e) => {
                error!(error = %e, "Restock failed, batch rolled back");
                RestockOutcome::failed(e)
            }
        }
    }

    async fn restock_in_transaction(&self) -> Result<Vec<Product>> {
        let mut tx = self.product_repo.begin_transaction().await?;

        match apply_restock(tx.as_mut(), self.policy).await {
            Ok(updated) => {
                tx.commit().await?;
                Ok(updated)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed (transaction dropped)");
                }
                Err(e)
            }
        }
    }
}

async fn apply_restock(
    tx: &mut dyn ProductRepositoryTransaction,
    policy: RestockPolicy,
) -> Result<Vec<Product>> {
    let low_stock = tx.find_low_stock(policy.threshold).await?;
    let mut updated = Vec::with_capacity(low_stock.len());

    for product in low_stock {
        match tx
            .increment_stock(product.id, policy.increment, policy.threshold)
            .await?
        {
            Some(product) => updated.push(product),
            None => debug!(product_id = product.id, "Already restocked, skipping"),
        }
    }

    Ok(updated)
}

/// Scheduled wrapper: runs the mutation and appends the result to the restock log
pub struct RestockJob {
    service: Arc<RestockService>,
    sink: Arc<dyn LogSink>,
    time_provider: Arc<dyn TimeProvider>,
}

impl RestockJob {
    pub fn new(
        service: Arc<RestockService>,
        sink: Arc<dyn LogSink>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            service,
            sink,
            time_provider,
        }
    }

    fn log_lines(&self, outcome: &RestockOutcome) -> Vec<String> {
        let ts = self.time_provider.now().format(LOG_TIMESTAMP_FORMAT);
        if !outcome.success {
            return vec![format!("{} - ERROR: {}", ts, outcome.message)];
        }
        outcome
            .updated_products
            .iter()
            .map(|p| format!("{} - Restocked {}: stock now {}", ts, p.name, p.stock))
            .chain(std::iter::once(format!("{} - {}", ts, outcome.message)))
            .collect()
    }
}

#[async_trait]
impl ScheduledJob for RestockJob {
    fn name(&self) -> &'static str {
        "restock"
    }

    async fn run(&self) -> JobOutcome {
        let outcome = self.service.update_low_stock_products().await;

        for line in self.log_lines(&outcome) {
            if let Err(e) = self.sink.append_line(&line).await {
                error!(
                    error = %e,
                    path = self.sink.location(),
                    "Error writing restock log"
                );
            }
        }

        if outcome.success {
            JobOutcome::Completed(outcome.message)
        } else {
            JobOutcome::Failed(outcome.message)
        }
    }
}
