//! SubMan Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout SubMan:
//! - Month-granularity dates (`MM-YYYY`)
//! - Billing-period aggregation over subscription sets
//! - Pagination arithmetic
//! - The `SubscriptionStore` persistence abstraction
//! - Core error types

pub mod billing;
pub mod error;
pub mod month;
pub mod pagination;
pub mod subscription;
pub mod subscription_store;

pub use billing::{AggregationResult, QueryPeriod, aggregate};
pub use error::{Error, Result};
pub use month::MonthDate;
pub use pagination::{Page, PageRequest, total_pages};
pub use subscription::{NewSubscription, Subscription};
pub use subscription_store::{PeriodFilter, SubscriptionStore};
