//! SubMan HTTP Server
//!
//! REST API over subscription records:
//! - CRUD and paginated listing under `/api/v1/subscriptions`
//! - Period cost aggregation at `/api/v1/subscriptions/total-cost`
//! - Health and Prometheus endpoints at `/healthz`, `/readyz`, `/metrics`

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod router;

pub use app::{AppState, StoreReadiness};
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use router::build_router;
