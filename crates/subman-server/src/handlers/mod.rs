//! HTTP handlers for the `/api/v1` routes

pub mod subscriptions;
pub mod total_cost;

use axum::extract::rejection::JsonRejection;
use tracing::warn;

use crate::error::ApiError;

/// Parse a `{id}` path segment
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request("invalid id"))
}

fn invalid_json(rejection: JsonRejection) -> ApiError {
    warn!("Invalid JSON in request body: {}", rejection.body_text());
    ApiError::bad_request("invalid JSON")
}
