//! Period cost aggregation endpoint

use axum::{
    Json,
    extract::{Query, State},
};
use subman_core::{PeriodFilter, aggregate};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiResult;
use crate::models::{TotalCostQuery, TotalCostResponse};

/// `GET /subscriptions/total-cost?start_period&end_period&user_id&service_name`
///
/// The store narrows candidates with a coarse predicate; `aggregate`
/// re-derives the overlap of every record before billing it.
pub async fn total_cost(
    State(state): State<AppState>,
    Query(query): Query<TotalCostQuery>,
) -> ApiResult<Json<TotalCostResponse>> {
    let cost_filter = query.into_filter()?;

    let mut filter = PeriodFilter::new(cost_filter.period);
    if let Some(user_id) = cost_filter.user_id {
        filter = filter.with_user_id(user_id);
    }
    if let Some(service_name) = cost_filter.service_name {
        filter = filter.with_service_name(service_name);
    }

    let candidates = match state.store.find_for_period(&filter).await {
        Ok(candidates) => candidates,
        Err(e) => {
            state.metrics.record_cost_query_failure();
            return Err(e.into());
        }
    };

    let result = match aggregate(&candidates, &filter.period) {
        Ok(result) => result,
        Err(e) => {
            state.metrics.record_cost_query_failure();
            return Err(e.into());
        }
    };
    state.metrics.record_cost_query(result.subscriptions_counted);

    info!(
        start_period = %filter.period.start_month,
        end_period = %filter.period.end_month,
        candidates = candidates.len(),
        subscriptions_count = result.subscriptions_counted,
        total_cost = result.total_cost,
        "Total cost calculated"
    );

    Ok(Json(TotalCostResponse::new(
        result,
        &filter.period,
        &state.currency,
    )))
}
