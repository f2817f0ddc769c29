//! Request and response bodies for the REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subman_core::{AggregationResult, MonthDate, NewSubscription, QueryPeriod, Subscription};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Body of `POST /subscriptions` and `PUT /subscriptions/{id}`
///
/// Missing fields decode to their zero values so that validation, not the
/// JSON decoder, decides which message the caller sees.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubscriptionRequest {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl SubscriptionRequest {
    /// Validate the body and convert it into a storable record
    ///
    /// Checks run in a fixed order and the first failure wins: price,
    /// required fields, user id, start date, end date, date ordering.
    pub fn into_new_subscription(self) -> ApiResult<NewSubscription> {
        if self.price <= 0 {
            return Err(ApiError::bad_request("price must be more than zero"));
        }

        if self.service_name.is_empty() || self.user_id.is_empty() || self.start_date.is_empty() {
            return Err(ApiError::bad_request("request field is empty"));
        }

        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|_| ApiError::bad_request("invalid user_id, must be UUID"))?;

        let start_month = MonthDate::parse(&self.start_date)
            .map_err(|_| ApiError::bad_request("invalid start_date, expected MM-YYYY"))?;

        let end_month = match self.end_date.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                MonthDate::parse(raw)
                    .map_err(|_| ApiError::bad_request("invalid end_date, expected MM-YYYY"))?,
            ),
        };

        let subscription = NewSubscription {
            service_name: self.service_name,
            price: self.price,
            user_id,
            start_month,
            end_month,
        };
        subscription.validate()?;

        Ok(subscription)
    }
}

/// A stored subscription as rendered to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: MonthDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<MonthDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id,
            service_name: sub.service_name,
            price: sub.price,
            user_id: sub.user_id,
            start_date: sub.start_month,
            end_date: sub.end_month,
            created_at: sub.created_at,
            updated_at: sub.updated_at,
        }
    }
}

/// Raw `page`/`limit` query values; anything unparsable falls back to defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Vec<SubscriptionResponse>,
    pub meta: ListMeta,
}

/// Query string of `GET /subscriptions/total-cost`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TotalCostQuery {
    pub start_period: Option<String>,
    pub end_period: Option<String>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

/// A validated total-cost query
#[derive(Debug, Clone, PartialEq)]
pub struct CostFilter {
    pub period: QueryPeriod,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

impl TotalCostQuery {
    pub fn into_filter(self) -> ApiResult<CostFilter> {
        let (Some(start), Some(end)) = (non_empty(self.start_period), non_empty(self.end_period))
        else {
            return Err(ApiError::bad_request(
                "start_period and end_period are required",
            ));
        };

        let start_month = MonthDate::parse(&start)
            .map_err(|_| ApiError::bad_request("invalid start_period, expected MM-YYYY"))?;
        let end_month = MonthDate::parse(&end)
            .map_err(|_| ApiError::bad_request("invalid end_period, expected MM-YYYY"))?;

        let period = QueryPeriod::new(start_month, end_month)?;

        let user_id = non_empty(self.user_id)
            .map(|raw| {
                Uuid::parse_str(&raw).map_err(|_| ApiError::bad_request("invalid user_id format"))
            })
            .transpose()?;

        Ok(CostFilter {
            period,
            user_id,
            service_name: non_empty(self.service_name),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalCostResponse {
    pub total_cost: i64,
    pub currency: String,
    pub period_start: MonthDate,
    pub period_end: MonthDate,
    pub subscriptions_count: usize,
}

impl TotalCostResponse {
    pub fn new(result: AggregationResult, period: &QueryPeriod, currency: &str) -> Self {
        Self {
            total_cost: result.total_cost,
            currency: currency.to_string(),
            period_start: period.start_month,
            period_end: period.end_month,
            subscriptions_count: result.subscriptions_counted,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
