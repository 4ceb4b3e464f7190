// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use crate::product_repository::{ProductRow, PRODUCT_COLUMNS};
use async_trait::async_trait;
use crm_core::domain::{Product, ProductId};
use crm_core::error::Result;
use crm_core::port::{ProductRepositoryTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

pub struct SqliteProductTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteProductTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteProductTransaction<'_> {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepositoryTransaction for SqliteProductTransaction<'_> {
    async fn find_low_stock(&mut self, threshold: i64) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE stock < ? ORDER BY id ASC",
            PRODUCT_COLUMNS
        ))
        .bind(threshold)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    async fn increment_stock(
        &mut self,
        id: ProductId,
        increment: i64,
        threshold: i64,
    ) -> Result<Option<Product>> {
        // Guarded so a concurrent run that already restocked this row is a no-op
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r#"
            UPDATE products
            SET stock = stock + ?
            WHERE id = ? AND stock < ?
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(increment)
        .bind(id)
        .bind(threshold)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRow::into_product))
    }
}
