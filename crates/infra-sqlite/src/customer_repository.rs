// SQLite CustomerRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use crm_core::domain::{Customer, CustomerFilter, CustomerId};
use crm_core::error::{AppError, Result};
use crm_core::port::CustomerRepository;
use sqlx::SqlitePool;

pub struct SqliteCustomerRepository {
    pool: SqlitePool,
}

impl SqliteCustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for SqliteCustomerRepository {
    async fn insert(&self, name: &str, email: &str, phone: Option<&str>) -> Result<Customer> {
        if email.trim().is_empty() {
            return Err(AppError::Validation("customer email is required".to_string()));
        }

        let row: CustomerRow = sqlx::query_as(
            r#"
            INSERT INTO customers (name, email, phone) VALUES (?, ?, ?)
            RETURNING id, name, email, phone
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row: Option<CustomerRow> =
            sqlx::query_as("SELECT id, name, email, phone FROM customers WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(Customer::from))
    }

    async fn list(&self, filter: &CustomerFilter) -> Result<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone FROM customers
            WHERE (?1 IS NULL OR LOWER(name) LIKE '%' || LOWER(?1) || '%')
              AND (?2 IS NULL OR LOWER(email) LIKE '%' || LOWER(?2) || '%')
            ORDER BY id ASC
            "#,
        )
        .bind(filter.name_contains.as_deref())
        .bind(filter.email_contains.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    email: String,
    phone: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    async fn setup_test_db() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_find_count() {
        let repo = SqliteCustomerRepository::new(setup_test_db().await);

        let alice = repo
            .insert("Alice", "alice@example.com", Some("+1-555-0100"))
            .await
            .unwrap();
        repo.insert("Bob", "bob@example.com", None).await.unwrap();

        let found = repo.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(found, alice);
        assert_eq!(found.phone.as_deref(), Some("+1-555-0100"));
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let repo = SqliteCustomerRepository::new(setup_test_db().await);
        repo.insert("Alice", "alice@example.com", None).await.unwrap();

        let err = repo
            .insert("Alice Again", "alice@example.com", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unique constraint violation"));
    }

    #[tokio::test]
    async fn test_empty_email_rejected() {
        let repo = SqliteCustomerRepository::new(setup_test_db().await);
        let err = repo.insert("Nobody", "  ", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_filter() {
        let repo = SqliteCustomerRepository::new(setup_test_db().await);
        repo.insert("Alice", "alice@example.com", None).await.unwrap();
        repo.insert("Bob", "bob@corp.test", None).await.unwrap();

        let filtered = repo
            .list(&CustomerFilter {
                email_contains: Some("CORP".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Bob");
    }
}
