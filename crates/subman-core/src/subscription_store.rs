//! Subscription store trait
//!
//! The `SubscriptionStore` trait abstracts over the relational store that
//! holds subscription records, so the HTTP layer can be exercised against an
//! in-memory implementation in tests and against PostgreSQL in production.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    NewSubscription, Page, PageRequest, QueryPeriod, Result, Subscription,
};

/// Filters applied by the store before cost aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodFilter {
    pub period: QueryPeriod,
    /// Only subscriptions owned by this user
    pub user_id: Option<Uuid>,
    /// Exact, case-sensitive service name match
    pub service_name: Option<String>,
}

impl PeriodFilter {
    pub fn new(period: QueryPeriod) -> Self {
        Self {
            period,
            user_id: None,
            service_name: None,
        }
    }

    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    /// Coarse overlap check mirroring the SQL predicate
    ///
    /// `start_date <= period_end AND (end_date >= period_start OR end_date IS NULL)`
    /// plus the optional user and service filters.
    pub fn matches(&self, subscription: &Subscription) -> bool {
        let overlaps = subscription.start_month <= self.period.end_month
            && subscription
                .end_month
                .is_none_or(|end| end >= self.period.start_month);

        overlaps
            && self.user_id.is_none_or(|id| id == subscription.user_id)
            && self
                .service_name
                .as_deref()
                .is_none_or(|name| name == subscription.service_name)
    }
}

/// Subscription store trait
///
/// Implementations:
/// - `PostgresSubscriptionStore`: PostgreSQL via sqlx
///
/// # Example
/// ```no_run
/// # use subman_core::{MonthDate, PeriodFilter, QueryPeriod, SubscriptionStore, aggregate};
/// # async fn example(store: &dyn SubscriptionStore) -> subman_core::Result<()> {
/// let period = QueryPeriod::new(MonthDate::parse("01-2025")?, MonthDate::parse("06-2025")?)?;
/// let candidates = store.find_for_period(&PeriodFilter::new(period)).await?;
/// let result = aggregate(&candidates, &period)?;
/// println!("total: {}", result.total_cost);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert a subscription and return the stored record
    ///
    /// # Errors
    /// - `Error::Database` for write errors
    async fn create(&self, subscription: NewSubscription) -> Result<Subscription>;

    /// Get a single subscription by ID
    ///
    /// # Errors
    /// - `Error::SubscriptionNotFound` if it doesn't exist
    /// - `Error::Database` for read errors
    async fn get(&self, id: i64) -> Result<Subscription>;

    /// Replace every client-supplied field of a subscription
    ///
    /// # Errors
    /// - `Error::SubscriptionNotFound` if it doesn't exist
    /// - `Error::Database` for write errors
    async fn update(&self, id: i64, subscription: NewSubscription) -> Result<Subscription>;

    /// Delete a subscription
    ///
    /// # Errors
    /// - `Error::SubscriptionNotFound` if it doesn't exist
    /// - `Error::Database` for write errors
    async fn delete(&self, id: i64) -> Result<()>;

    /// List subscriptions, newest first
    ///
    /// # Returns
    /// The requested page and the total number of stored subscriptions.
    async fn list(&self, page: PageRequest) -> Result<Page<Subscription>>;

    /// Subscriptions that may overlap the filter's period
    ///
    /// The overlap check is coarse; callers re-derive exact overlap.
    async fn find_for_period(&self, filter: &PeriodFilter) -> Result<Vec<Subscription>>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<()> {
        // Default implementation: always reachable
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MonthDate;
    use chrono::Utc;

    fn month(text: &str) -> MonthDate {
        MonthDate::parse(text).unwrap()
    }

    fn subscription(user_id: Uuid, name: &str, start: &str, end: Option<&str>) -> Subscription {
        Subscription {
            id: 1,
            service_name: name.to_string(),
            price: 100,
            user_id,
            start_month: month(start),
            end_month: end.map(month),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_overlap() {
        let user = Uuid::new_v4();
        let filter = PeriodFilter::new(
            QueryPeriod::new(month("01-2025"), month("06-2025")).unwrap(),
        );

        assert!(filter.matches(&subscription(user, "a", "01-2024", None)));
        assert!(filter.matches(&subscription(user, "a", "06-2025", None)));
        assert!(filter.matches(&subscription(user, "a", "01-2024", Some("01-2025"))));
        assert!(!filter.matches(&subscription(user, "a", "07-2025", None)));
        assert!(!filter.matches(&subscription(user, "a", "01-2024", Some("12-2024"))));
    }

    #[test]
    fn test_filter_user_and_service() {
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let filter = PeriodFilter::new(
            QueryPeriod::new(month("01-2025"), month("06-2025")).unwrap(),
        )
        .with_user_id(user)
        .with_service_name("Netflix");

        assert!(filter.matches(&subscription(user, "Netflix", "01-2025", None)));
        assert!(!filter.matches(&subscription(other, "Netflix", "01-2025", None)));
        assert!(!filter.matches(&subscription(user, "netflix", "01-2025", None)));
    }
}
