// SQLite OrderRepository Implementation

use crate::amount::{from_cents, to_cents};
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crm_core::domain::{
    CustomerId, CustomerRef, Order, OrderFilter, OrderId, OrderRecord, OrderStatus,
};
use crm_core::error::{AppError, Result};
use crm_core::port::OrderRepository;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::warn;

const RECORD_SELECT: &str = r#"
    SELECT o.id, o.customer_id, o.order_date, o.total_amount_cents, o.status,
           c.name AS customer_name, c.email AS customer_email
    FROM orders o
    LEFT JOIN customers c ON c.id = o.customer_id
"#;

pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn insert(
        &self,
        customer_id: CustomerId,
        order_date: DateTime<Utc>,
        total_amount: Option<Decimal>,
        status: OrderStatus,
    ) -> Result<Order> {
        let cents = match total_amount {
            Some(amount) => Some(to_cents(amount).ok_or_else(|| {
                AppError::Validation(format!("amount out of range: {}", amount))
            })?),
            None => None,
        };

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (customer_id, order_date, total_amount_cents, status)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(customer_id)
        .bind(order_date.timestamp_millis())
        .bind(cents)
        .bind(status.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Order {
            id,
            customer_id,
            order_date,
            total_amount: cents.map(from_cents),
            status,
        })
    }

    async fn find_record(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{} WHERE o.id = ?", RECORD_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(OrderRow::into_record))
    }

    async fn list_records(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"{}
            WHERE (?1 IS NULL OR o.customer_id = ?1)
              AND (?2 IS NULL OR o.status = ?2)
              AND (?3 IS NULL OR o.order_date >= ?3)
              AND (?4 IS NULL OR o.order_date <= ?4)
            ORDER BY o.order_date ASC, o.id ASC
            "#,
            RECORD_SELECT
        ))
        .bind(filter.customer_id)
        .bind(filter.status.map(|s| s.to_string()))
        .bind(filter.order_date_gte.map(|d| d.timestamp_millis()))
        .bind(filter.order_date_lte.map(|d| d.timestamp_millis()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(OrderRow::into_record).collect())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn revenue_sum(&self) -> Result<Decimal> {
        // NULL amounts contribute nothing; an empty table sums to 0
        let cents: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(total_amount_cents), 0) FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(from_cents(cents))
    }
}

/// SQLite row representation (order joined with its customer)
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_id: i64,
    order_date: i64,
    total_amount_cents: Option<i64>,
    status: String,
    customer_name: Option<String>,
    customer_email: Option<String>,
}

impl OrderRow {
    fn into_record(self) -> OrderRecord {
        let status = match self.status.parse::<OrderStatus>() {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(order_id = self.id, error = %e, "Unreadable order status");
                None
            }
        };

        let customer = self.customer_name.map(|name| CustomerRef {
            id: Some(self.customer_id),
            name: Some(name),
            email: self.customer_email,
        });

        OrderRecord {
            id: Some(self.id),
            customer,
            order_date: DateTime::from_timestamp_millis(self.order_date),
            total_amount: self.total_amount_cents.map(from_cents),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations, SqliteCustomerRepository};
    use chrono::{Duration, TimeZone};
    use crm_core::port::CustomerRepository;

    async fn setup_test_db() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, d, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_revenue_counts_missing_amounts_as_zero() {
        let pool = setup_test_db().await;
        let customers = SqliteCustomerRepository::new(pool.clone());
        let orders = SqliteOrderRepository::new(pool);
        let alice = customers.insert("Alice", "alice@example.com", None).await.unwrap();

        for amount in [Some(Decimal::new(1050, 2)), Some(Decimal::ZERO), None] {
            orders
                .insert(alice.id, day(1), amount, OrderStatus::Pending)
                .await
                .unwrap();
        }

        assert_eq!(orders.count().await.unwrap(), 3);
        assert_eq!(orders.revenue_sum().await.unwrap(), Decimal::new(1050, 2));
    }

    #[tokio::test]
    async fn test_empty_revenue_is_zero() {
        let orders = SqliteOrderRepository::new(setup_test_db().await);
        assert_eq!(orders.revenue_sum().await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_records_carry_customer_email() {
        let pool = setup_test_db().await;
        let customers = SqliteCustomerRepository::new(pool.clone());
        let orders = SqliteOrderRepository::new(pool);
        let alice = customers.insert("Alice", "alice@example.com", None).await.unwrap();

        let order = orders
            .insert(alice.id, day(2), Some(Decimal::new(999, 2)), OrderStatus::Shipped)
            .await
            .unwrap();
        let record = orders.find_record(order.id).await.unwrap().unwrap();

        assert_eq!(record.customer_email(), Some("alice@example.com"));
        assert_eq!(record.order_date, Some(day(2)));
        assert_eq!(record.status, Some(OrderStatus::Shipped));
        assert_eq!(record.total_amount, Some(Decimal::new(999, 2)));
    }

    #[tokio::test]
    async fn test_date_lower_bound_is_inclusive() {
        let pool = setup_test_db().await;
        let customers = SqliteCustomerRepository::new(pool.clone());
        let orders = SqliteOrderRepository::new(pool);
        let alice = customers.insert("Alice", "alice@example.com", None).await.unwrap();

        let cutoff = day(3);
        for date in [cutoff - Duration::days(1), cutoff, cutoff + Duration::hours(5)] {
            orders
                .insert(alice.id, date, None, OrderStatus::Pending)
                .await
                .unwrap();
        }

        let recent = orders.list_records(&OrderFilter::since(cutoff)).await.unwrap();
        let dates: Vec<_> = recent.iter().filter_map(|r| r.order_date).collect();
        assert_eq!(dates, vec![cutoff, cutoff + Duration::hours(5)]);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_foreign_key_violation() {
        let orders = SqliteOrderRepository::new(setup_test_db().await);

        let err = orders
            .insert(42, day(1), None, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Foreign key constraint violation"));
    }
}
