//! SubMan Server - subscription tracking REST API
//!
//! Usage:
//! ```bash
//! # With environment variables (a .env file is picked up too)
//! DATABASE_URL=postgres://localhost/subman subman-server
//!
//! # With a config file (env vars override file values)
//! subman-server --config subman.yaml
//!
//! # Apply schema migrations and exit
//! subman-server migrate
//! ```
//!
//! Test with:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/subscriptions \
//!   -H "Content-Type: application/json" \
//!   -d '{"service_name": "Yandex Plus", "price": 400,
//!        "user_id": "60601fee-2bf1-4721-ae6f-7636e79a0cba", "start_date": "07-2025"}'
//!
//! curl "http://localhost:8080/api/v1/subscriptions/total-cost?start_period=01-2025&end_period=12-2025"
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use subman_core::SubscriptionStore;
use subman_observability::{HealthState, Metrics};
use subman_server::{AppState, ServerConfig, StoreReadiness, build_router, logging};
use subman_storage_postgres::{PostgresSubscriptionStore, migrations};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// SubMan Server - subscription tracking API
#[derive(Parser)]
#[command(name = "subman-server")]
#[command(about = "REST API for tracking user subscriptions and their cost", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "SUBMAN_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Address to bind to (overrides config and SUBMAN_HOST)
    #[arg(long, value_name = "HOST", global = true)]
    host: Option<String>,

    /// Port to listen on (overrides config, PORT and SUBMAN_PORT)
    #[arg(short, long, value_name = "PORT", global = true)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server (default if no command specified)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    config.merge_env();

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine; the environment may already be populated
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    logging::init_tracing(&config.logging)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(config).await,
    }
}

async fn migrate(config: ServerConfig) -> anyhow::Result<()> {
    info!("Applying database migrations");

    let store = PostgresSubscriptionStore::with_config(
        &config.database.url,
        config.store_config().with_run_migrations(false),
    )
    .await
    .context("connecting to PostgreSQL")?;

    migrations::run_migrations(store.pool()).await?;
    store.close().await;

    info!("Migrations complete");
    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    info!("Starting SubMan server");

    let postgres = Arc::new(
        PostgresSubscriptionStore::with_config(&config.database.url, config.store_config())
            .await
            .context("connecting to PostgreSQL")?,
    );
    info!(
        max_connections = config.database.max_connections,
        migrations = config.database.run_migrations,
        "Connected to PostgreSQL"
    );

    let store: Arc<dyn SubscriptionStore> = postgres.clone();
    let metrics = Arc::new(Metrics::new()?);

    let health = HealthState::with_readiness_checker(
        metrics.clone(),
        Arc::new(StoreReadiness::new(store.clone())),
    );
    let state = AppState::new(store, metrics, config.billing.currency.clone());
    let app = build_router(state, health, config.request_timeout());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;
    let listener = TcpListener::bind(addr).await?;

    info!("✅ SubMan listening on http://{}", addr);
    info!("   API:     http://{}/api/v1/subscriptions", addr);
    info!("   Health:  http://{}/healthz", addr);
    info!("   Metrics: http://{}/metrics", addr);

    run_until_shutdown(listener, app, config.shutdown_timeout()).await?;

    postgres.close().await;
    info!("SubMan server stopped");
    Ok(())
}

/// Serve until a shutdown signal arrives, then give in-flight requests
/// `grace` to finish before aborting
async fn run_until_shutdown(
    listener: TcpListener,
    app: axum::Router,
    grace: Duration,
) -> anyhow::Result<()> {
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = signalled_tx.send(());
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
        }
        _ = signalled_rx => {
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result??,
                Err(_) => {
                    warn!("Graceful shutdown exceeded {:?}, aborting open connections", grace);
                    server.abort();
                }
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
