// SQLite ProductRepository Implementation

use crate::amount::from_cents;
use crate::error::map_sqlx_error;
use crate::SqliteProductTransaction;
use async_trait::async_trait;
use crm_core::domain::{DomainError, Product, ProductFilter, ProductId};
use crm_core::error::Result;
use crm_core::port::{ProductRepository, ProductRepositoryTransaction, TransactionalProductRepository};
use sqlx::SqlitePool;
use tracing::debug;

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, stock, price_cents";

pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn insert(&self, name: &str, stock: i64) -> Result<Product> {
        if stock < 0 {
            return Err(DomainError::InvalidStock(stock).into());
        }

        let row: ProductRow = sqlx::query_as(&format!(
            "INSERT INTO products (name, stock) VALUES (?, ?) RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(name)
        .bind(stock)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(product_id = row.id, name, stock, "Product inserted");
        Ok(row.into_product())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRow::into_product))
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM products
            WHERE (?1 IS NULL OR LOWER(name) LIKE '%' || LOWER(?1) || '%')
              AND (?2 IS NULL OR stock < ?2)
              AND (?3 IS NULL OR stock >= ?3)
            ORDER BY id ASC
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(filter.name_contains.as_deref())
        .bind(filter.stock_lt)
        .bind(filter.stock_gte)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }
}

#[async_trait]
impl TransactionalProductRepository for SqliteProductRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn ProductRepositoryTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteProductTransaction::new(tx)))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: i64,
    name: String,
    stock: i64,
    price_cents: Option<i64>,
}

impl ProductRow {
    pub(crate) fn into_product(self) -> Product {
        Product {
            id: self.id,
            name: self.name,
            stock: self.stock,
            price: self.price_cents.map(from_cents),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use crm_core::AppError;

    async fn setup_test_db() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = SqliteProductRepository::new(setup_test_db().await);

        let product = repo.insert("Laptop", 3).await.unwrap();
        let found = repo.find_by_id(product.id).await.unwrap().unwrap();

        assert_eq!(found.name, "Laptop");
        assert_eq!(found.stock, 3);
        assert!(found.price.is_none());
        assert!(repo.find_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_negative_stock_rejected() {
        let repo = SqliteProductRepository::new(setup_test_db().await);

        let err = repo.insert("Ghost", -1).await.unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::InvalidStock(-1))));
    }

    #[tokio::test]
    async fn test_list_with_filter() {
        let repo = SqliteProductRepository::new(setup_test_db().await);
        repo.insert("Laptop", 3).await.unwrap();
        repo.insert("Laptop Stand", 25).await.unwrap();
        repo.insert("Mouse", 9).await.unwrap();

        let all = repo.list(&ProductFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let low = repo.list(&ProductFilter::low_stock(10)).await.unwrap();
        let names: Vec<&str> = low.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Laptop", "Mouse"]);

        let laptops = repo
            .list(&ProductFilter {
                name_contains: Some("LAPTOP".to_string()),
                stock_gte: Some(10),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(laptops.len(), 1);
        assert_eq!(laptops[0].name, "Laptop Stand");
    }
}
