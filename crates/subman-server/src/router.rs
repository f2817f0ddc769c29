//! Route table and middleware stack

use axum::{
    Router,
    extract::Request,
    middleware,
    routing::get,
};
use std::time::Duration;
use subman_observability::{HealthState, health_router};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::handlers::{subscriptions, total_cost};
use crate::middleware::track_metrics;

/// Subscription routes, relative to `/api/v1`
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions",
            get(subscriptions::list).post(subscriptions::create),
        )
        .route("/subscriptions/total-cost", get(total_cost::total_cost))
        .route(
            "/subscriptions/{id}",
            get(subscriptions::get)
                .put(subscriptions::update)
                .delete(subscriptions::delete),
        )
}

/// Build the complete application router
pub fn build_router(state: AppState, health: HealthState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .nest("/api/v1", api_routes())
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_metrics,
        ))
        .with_state(state);

    api.merge(health_router(health)).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
