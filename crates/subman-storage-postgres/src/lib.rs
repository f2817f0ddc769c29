//! PostgreSQL-backed subscription storage for SubMan
//!
//! This crate implements the `SubscriptionStore` trait using PostgreSQL via sqlx.
//!
//! # Features
//! - Connection pool tuning through `PostgresStoreConfig`
//! - Versioned schema migrations tracked in `schema_migrations`
//! - Coarse period-overlap filtering pushed down to SQL
//!
//! # Example
//! ```no_run
//! # use subman_storage_postgres::PostgresSubscriptionStore;
//! # async fn example() -> subman_core::Result<()> {
//! let store = PostgresSubscriptionStore::new("postgres://localhost/subman").await?;
//! # Ok(())
//! # }
//! ```

mod config;
pub mod migrations;
mod postgres_subscription_store;

pub use config::PostgresStoreConfig;
pub use postgres_subscription_store::PostgresSubscriptionStore;
