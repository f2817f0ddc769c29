//! Subscription records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, MonthDate, Result};

/// A stored subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub service_name: String,
    /// Monthly price in whole currency units
    pub price: i64,
    pub user_id: Uuid,
    pub start_month: MonthDate,
    /// `None` while the subscription is still active
    pub end_month: Option<MonthDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by a client when creating or replacing a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_month: MonthDate,
    pub end_month: Option<MonthDate>,
}

impl NewSubscription {
    /// Check the record-level invariants the store relies on
    ///
    /// # Errors
    /// - `Error::InvalidArgument` for an empty service name, a non-positive
    ///   price, or an end month earlier than the start month
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "service_name must not be empty".to_string(),
            ));
        }
        if self.price <= 0 {
            return Err(Error::InvalidArgument(
                "price must be more than zero".to_string(),
            ));
        }
        if let Some(end) = self.end_month {
            if end < self.start_month {
                return Err(Error::InvalidArgument(
                    "end_date must not be before start_date".to_string(),
                ));
            }
        }
        Ok(())
    }
}
