// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid stock quantity: {0}")]
    InvalidStock(i64),

    #[error("Invalid restock policy: {0}")]
    InvalidPolicy(String),

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
