//! Billing-period aggregation
//!
//! Computes how many whole months of each subscription fall inside a query
//! period and sums the resulting cost. Both boundary months are billed, so a
//! period of `[01-2025, 01-2025]` covers exactly one month.
//!
//! The store pre-filters candidates with a coarse SQL overlap predicate, but
//! the aggregator does not rely on it: overlap is re-derived for every record
//! and records without any overlapping month are neither billed nor counted.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Error, MonthDate, Result, Subscription};

/// Inclusive month range a cost query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPeriod {
    pub start_month: MonthDate,
    pub end_month: MonthDate,
}

impl QueryPeriod {
    /// Build a period, rejecting one that ends before it starts
    ///
    /// # Errors
    /// - `Error::InvalidArgument` if `end_month < start_month`
    pub fn new(start_month: MonthDate, end_month: MonthDate) -> Result<Self> {
        if end_month < start_month {
            return Err(Error::InvalidArgument(
                "end_period must be after start_period".to_string(),
            ));
        }
        Ok(Self {
            start_month,
            end_month,
        })
    }

    /// Number of months the period itself spans
    pub fn months(&self) -> i64 {
        month_span(self.start_month, self.end_month)
    }
}

/// Total cost of a subscription set over one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub total_cost: i64,
    /// Subscriptions with at least one billed month in the period
    pub subscriptions_counted: usize,
}

/// Inclusive number of months from `start` to `end`
///
/// Non-positive when `end` precedes `start`.
pub fn month_span(start: MonthDate, end: MonthDate) -> i64 {
    let years = i64::from(end.year()) - i64::from(start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    years * 12 + months + 1
}

/// Months of `subscription` that fall inside `period`
///
/// Returns `None` when the intervals do not intersect. An open-ended
/// subscription is clipped to the period end.
pub fn overlap_months(subscription: &Subscription, period: &QueryPeriod) -> Option<i64> {
    let overlap_start = subscription.start_month.max(period.start_month);
    let overlap_end = match subscription.end_month {
        Some(end) => end.min(period.end_month),
        None => period.end_month,
    };

    if overlap_start > overlap_end {
        return None;
    }

    Some(month_span(overlap_start, overlap_end))
}

/// Sum the cost of `subscriptions` over `period`
///
/// A reversed period produces no overlaps and therefore an empty result.
///
/// # Errors
/// - `Error::InvalidArgument` if the total does not fit in an `i64`
pub fn aggregate(subscriptions: &[Subscription], period: &QueryPeriod) -> Result<AggregationResult> {
    subscriptions
        .iter()
        .try_fold(AggregationResult::default(), |mut acc, subscription| {
            match overlap_months(subscription, period) {
                Some(months) => {
                    acc.total_cost = months
                        .checked_mul(subscription.price)
                        .and_then(|cost| acc.total_cost.checked_add(cost))
                        .ok_or_else(|| {
                            Error::InvalidArgument("total cost overflows".to_string())
                        })?;
                    acc.subscriptions_counted += 1;
                }
                None => {
                    trace!(
                        subscription_id = subscription.id,
                        "Subscription has no months inside the query period"
                    );
                }
            }
            Ok(acc)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn month(text: &str) -> MonthDate {
        MonthDate::parse(text).unwrap()
    }

    fn period(start: &str, end: &str) -> QueryPeriod {
        QueryPeriod::new(month(start), month(end)).unwrap()
    }

    fn subscription(id: i64, price: i64, start: &str, end: Option<&str>) -> Subscription {
        Subscription {
            id,
            service_name: format!("service-{}", id),
            price,
            user_id: Uuid::new_v4(),
            start_month: month(start),
            end_month: end.map(month),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_month_is_inclusive() {
        assert_eq!(month_span(month("01-2025"), month("01-2025")), 1);
        assert_eq!(period("01-2025", "01-2025").months(), 1);
    }

    #[test]
    fn test_full_year_and_year_boundary() {
        assert_eq!(month_span(month("01-2025"), month("12-2025")), 12);
        assert_eq!(month_span(month("11-2024"), month("02-2025")), 4);
        assert_eq!(month_span(month("03-2025"), month("02-2025")), 0);
    }

    #[test]
    fn test_open_ended_subscription_is_clipped_to_period_end() {
        let sub = subscription(1, 100, "06-2024", None);
        assert_eq!(overlap_months(&sub, &period("01-2025", "03-2025")), Some(3));
    }

    #[test]
    fn test_subscription_ending_inside_period() {
        let sub = subscription(1, 100, "01-2024", Some("02-2025"));
        assert_eq!(overlap_months(&sub, &period("01-2025", "06-2025")), Some(2));
    }

    #[test]
    fn test_subscription_starting_after_period_start() {
        let sub = subscription(1, 100, "05-2025", None);
        assert_eq!(overlap_months(&sub, &period("01-2025", "06-2025")), Some(2));
    }

    #[test]
    fn test_no_overlap_is_excluded() {
        let before = subscription(1, 999, "01-2024", Some("06-2024"));
        let after = subscription(2, 999, "07-2025", None);
        let p = period("01-2025", "06-2025");

        assert_eq!(overlap_months(&before, &p), None);
        assert_eq!(overlap_months(&after, &p), None);

        let result = aggregate(&[before, after], &p).unwrap();
        assert_eq!(result, AggregationResult::default());
    }

    #[test]
    fn test_total_cost_scenario() {
        let subs = vec![
            subscription(1, 400, "01-2025", None),
            subscription(2, 1000, "03-2025", Some("05-2025")),
        ];

        let result = aggregate(&subs, &period("01-2025", "06-2025")).unwrap();
        assert_eq!(result.total_cost, 400 * 6 + 1000 * 3);
        assert_eq!(result.total_cost, 5400);
        assert_eq!(result.subscriptions_counted, 2);
    }

    #[test]
    fn test_total_cost_overflow_is_an_error() {
        let p = period("01-2025", "03-2025");

        // Three months of a huge price overflow the multiply
        let subs = vec![subscription(1, i64::MAX / 2, "01-2025", None)];
        let err = aggregate(&subs, &p).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref msg) if msg == "total cost overflows"));

        // Each contribution fits but their sum does not
        let subs = vec![
            subscription(1, i64::MAX / 3, "01-2025", None),
            subscription(2, i64::MAX / 3, "01-2025", None),
        ];
        assert!(aggregate(&subs, &p).is_err());
    }

    #[test]
    fn test_counts_only_overlapping_records() {
        // The storage filter is not trusted; a stray record must not be counted
        let subs = vec![
            subscription(1, 400, "01-2025", None),
            subscription(2, 250, "01-2023", Some("12-2023")),
        ];

        let result = aggregate(&subs, &period("01-2025", "02-2025")).unwrap();
        assert_eq!(result.total_cost, 800);
        assert_eq!(result.subscriptions_counted, 1);
    }

    #[test]
    fn test_reversed_period_produces_no_overlap() {
        let reversed = QueryPeriod {
            start_month: month("06-2025"),
            end_month: month("01-2025"),
        };
        let subs = vec![subscription(1, 400, "01-2020", None)];

        assert_eq!(aggregate(&subs, &reversed).unwrap(), AggregationResult::default());
    }

    #[test]
    fn test_period_rejects_reversed_bounds() {
        let err = QueryPeriod::new(month("06-2025"), month("01-2025")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            aggregate(&[], &period("01-2025", "12-2025")).unwrap(),
            AggregationResult::default()
        );
    }
}
