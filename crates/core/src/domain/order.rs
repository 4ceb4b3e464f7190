// Order Domain Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::customer::{Customer, CustomerId};
use crate::domain::error::DomainError;

/// Order ID (store-assigned integer key)
pub type OrderId = i64;

/// Order Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Processing => write!(f, "PROCESSING"),
            OrderStatus::Shipped => write!(f, "SHIPPED"),
            OrderStatus::Delivered => write!(f, "DELIVERED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Order Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: DateTime<Utc>,
    /// Missing amounts count as zero in revenue sums
    pub total_amount: Option<Decimal>,
    pub status: OrderStatus,
}

impl Order {
    pub fn new(
        id: OrderId,
        customer_id: CustomerId,
        order_date: DateTime<Utc>,
        total_amount: Option<Decimal>,
    ) -> Self {
        Self {
            id,
            customer_id,
            order_date,
            total_amount,
            status: OrderStatus::Pending,
        }
    }
}

/// Order query filter
///
/// Date bounds are inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date_gte: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date_lte: Option<DateTime<Utc>>,
}

impl OrderFilter {
    pub fn since(cutoff: DateTime<Utc>) -> Self {
        Self {
            order_date_gte: Some(cutoff),
            ..Default::default()
        }
    }
}

/// Customer fields nested in an order returned by the query API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    #[serde(default)]
    pub id: Option<CustomerId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Order as decoded from the query API
///
/// Every field is optional: the client decodes whatever the endpoint
/// returned once, and callers decide which fields they require.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default)]
    pub id: Option<OrderId>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl OrderRecord {
    pub fn from_parts(order: &Order, customer: Option<&Customer>) -> Self {
        Self {
            id: Some(order.id),
            customer: customer.map(|c| CustomerRef {
                id: Some(c.id),
                name: Some(c.name.clone()),
                email: Some(c.email.clone()),
            }),
            order_date: Some(order.order_date),
            total_amount: order.total_amount,
            status: Some(order.status),
        }
    }

    /// Customer email, if the nested customer resolved and carries a non-empty one
    pub fn customer_email(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|c| c.email.as_deref())
            .filter(|email| !email.trim().is_empty())
    }
}
