//! Shared application state

use async_trait::async_trait;
use std::sync::Arc;
use subman_core::SubscriptionStore;
use subman_observability::{Metrics, ReadinessChecker};

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubscriptionStore>,
    pub metrics: Arc<Metrics>,
    /// Currency label echoed by total-cost responses
    pub currency: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        metrics: Arc<Metrics>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            metrics,
            currency: currency.into(),
        }
    }
}

/// Reports the service ready while the subscription store answers pings
pub struct StoreReadiness {
    store: Arc<dyn SubscriptionStore>,
}

impl StoreReadiness {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReadinessChecker for StoreReadiness {
    async fn check_ready(&self) -> Result<(), String> {
        self.store.ping().await.map_err(|e| e.to_string())
    }
}
