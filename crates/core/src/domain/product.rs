// Product Domain Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Product ID (store-assigned integer key)
pub type ProductId = i64;

/// Product Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub stock: i64,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, stock: i64) -> Self {
        Self {
            id,
            name: name.into(),
            stock,
            price: None,
        }
    }

    /// Low stock means strictly below the threshold
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock < threshold
    }
}

/// Product query filter (all fields optional, combined with AND)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_lt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_gte: Option<i64>,
}

impl ProductFilter {
    pub fn low_stock(threshold: i64) -> Self {
        Self {
            stock_lt: Some(threshold),
            ..Default::default()
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(needle) = &self.name_contains {
            if !product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(lt) = self.stock_lt {
            if product.stock >= lt {
                return false;
            }
        }
        if let Some(gte) = self.stock_gte {
            if product.stock < gte {
                return false;
            }
        }
        true
    }
}

/// Threshold and increment applied by the restock operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockPolicy {
    pub threshold: i64,
    pub increment: i64,
}

impl Default for RestockPolicy {
    fn default() -> Self {
        Self {
            threshold: 10,
            increment: 10,
        }
    }
}

impl RestockPolicy {
    pub fn new(threshold: i64, increment: i64) -> Result<Self> {
        if increment <= 0 {
            return Err(DomainError::InvalidPolicy(format!(
                "increment must be positive, got {}",
                increment
            )));
        }
        if threshold <= 0 {
            return Err(DomainError::InvalidPolicy(format!(
                "threshold must be positive, got {}",
                threshold
            )));
        }
        Ok(Self {
            threshold,
            increment,
        })
    }
}

/// Result of one restock run (mirrors the mutation's response shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestockOutcome {
    pub updated_products: Vec<Product>,
    pub success: bool,
    pub message: String,
    pub updated_count: usize,
}

impl RestockOutcome {
    pub fn succeeded(updated_products: Vec<Product>) -> Self {
        let updated_count = updated_products.len();
        Self {
            updated_products,
            success: true,
            message: format!("Successfully updated {} low-stock products", updated_count),
            updated_count,
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            updated_products: Vec::new(),
            success: false,
            message: format!("Error updating low-stock products: {}", error),
            updated_count: 0,
        }
    }
}
