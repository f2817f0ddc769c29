//! Error types for SubMan Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A month-year token did not match `MM-YYYY`
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(i64),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
