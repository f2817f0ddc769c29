//! Metrics collection with Prometheus
//!
//! This module provides Prometheus metrics for SubMan:
//! - HTTP request counts and latency by route and status
//! - Subscription mutations by operation and outcome
//! - Total-cost query counts and the number of subscriptions they bill

use prometheus::{CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for SubMan
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    // HTTP metrics
    /// Total HTTP requests handled
    pub http_requests_total: CounterVec,
    /// HTTP request duration
    pub http_request_duration_seconds: HistogramVec,

    // Domain metrics
    /// Subscription create/update/delete operations
    pub subscription_operations_total: CounterVec,
    /// Total-cost queries answered
    pub cost_queries_total: CounterVec,
    /// Subscriptions billed per total-cost query
    pub cost_query_subscriptions: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = CounterVec::new(
            Opts::new("subman_http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "subman_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route"],
        )?;

        let subscription_operations_total = CounterVec::new(
            Opts::new(
                "subman_subscription_operations_total",
                "Subscription mutations by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;

        let cost_queries_total = CounterVec::new(
            Opts::new(
                "subman_cost_queries_total",
                "Total-cost queries by outcome",
            ),
            &["outcome"],
        )?;

        let cost_query_subscriptions = Histogram::with_opts(
            HistogramOpts::new(
                "subman_cost_query_subscriptions",
                "Subscriptions with at least one billed month per total-cost query",
            )
            .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0]),
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(subscription_operations_total.clone()))?;
        registry.register(Box::new(cost_queries_total.clone()))?;
        registry.register(Box::new(cost_query_subscriptions.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            http_requests_total,
            http_request_duration_seconds,
            subscription_operations_total,
            cost_queries_total,
            cost_query_subscriptions,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a finished HTTP request
    pub fn record_http_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        self.http_requests_total
            .with_label_values(&[method, route, &status.to_string()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration_secs);
    }

    /// Record a create/update/delete attempt
    pub fn record_subscription_operation(&self, operation: &str, success: bool) {
        self.subscription_operations_total
            .with_label_values(&[operation, outcome(success)])
            .inc();
    }

    /// Record a successful total-cost query
    pub fn record_cost_query(&self, subscriptions_counted: usize) {
        self.cost_queries_total
            .with_label_values(&[outcome(true)])
            .inc();
        self.cost_query_subscriptions
            .observe(subscriptions_counted as f64);
    }

    /// Record a total-cost query that failed after validation
    pub fn record_cost_query_failure(&self) {
        self.cost_queries_total
            .with_label_values(&[outcome(false)])
            .inc();
    }
}

fn outcome(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_http_request("GET", "/api/v1/subscriptions", 200, 0.01);

        let families = metrics.registry().gather();
        assert!(
            families
                .iter()
                .any(|f| f.name() == "subman_http_requests_total")
        );
    }

    #[test]
    fn test_record_subscription_operation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_subscription_operation("create", true);
        metrics.record_subscription_operation("create", true);
        metrics.record_subscription_operation("delete", false);

        let created = metrics
            .subscription_operations_total
            .with_label_values(&["create", "success"])
            .get();
        let failed_deletes = metrics
            .subscription_operations_total
            .with_label_values(&["delete", "failure"])
            .get();
        assert_eq!(created, 2.0);
        assert_eq!(failed_deletes, 1.0);
    }

    #[test]
    fn test_record_cost_query() {
        let metrics = Metrics::new().unwrap();
        metrics.record_cost_query(3);
        metrics.record_cost_query_failure();

        assert_eq!(metrics.cost_query_subscriptions.get_sample_count(), 1);
        assert_eq!(metrics.cost_query_subscriptions.get_sample_sum(), 3.0);
        assert_eq!(
            metrics
                .cost_queries_total
                .with_label_values(&["failure"])
                .get(),
            1.0
        );
    }
}
