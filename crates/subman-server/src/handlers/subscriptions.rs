//! Subscription CRUD and listing

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use subman_core::{PageRequest, total_pages};
use tracing::{debug, info};

use super::{invalid_json, parse_id};
use crate::app::AppState;
use crate::error::ApiResult;
use crate::models::{ListMeta, ListQuery, ListResponse, SubscriptionRequest, SubscriptionResponse};

/// `POST /subscriptions`
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubscriptionResponse>)> {
    let Json(request) = payload.map_err(invalid_json)?;
    let new_subscription = request.into_new_subscription()?;

    let result = state.store.create(new_subscription).await;
    state
        .metrics
        .record_subscription_operation("create", result.is_ok());
    let subscription = result?;

    info!(
        subscription_id = subscription.id,
        service_name = %subscription.service_name,
        "Subscription created"
    );

    Ok((StatusCode::CREATED, Json(subscription.into())))
}

/// `GET /subscriptions/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let id = parse_id(&id)?;
    let subscription = state.store.get(id).await?;
    Ok(Json(subscription.into()))
}

/// `PUT /subscriptions/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let id = parse_id(&id)?;
    let Json(request) = payload.map_err(invalid_json)?;
    let new_subscription = request.into_new_subscription()?;

    let result = state.store.update(id, new_subscription).await;
    state
        .metrics
        .record_subscription_operation("update", result.is_ok());
    let subscription = result?;

    info!(subscription_id = subscription.id, "Subscription updated");

    Ok(Json(subscription.into()))
}

/// `DELETE /subscriptions/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;

    let result = state.store.delete(id).await;
    state
        .metrics
        .record_subscription_operation("delete", result.is_ok());
    result?;

    info!(subscription_id = id, "Subscription deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /subscriptions?page&limit`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let page_request = PageRequest::clamped(
        query.page.and_then(|p| p.parse().ok()),
        query.limit.and_then(|l| l.parse().ok()),
    );

    let page = state.store.list(page_request).await?;
    let total_pages = total_pages(page.total, page_request.limit)?;

    debug!(
        page = page_request.page,
        limit = page_request.limit,
        total = page.total,
        "Listed subscriptions"
    );

    Ok(Json(ListResponse {
        data: page.items.into_iter().map(Into::into).collect(),
        meta: ListMeta {
            page: page_request.page,
            limit: page_request.limit,
            total: page.total,
            total_pages,
        },
    }))
}
