//! Server configuration
//!
//! Configuration is layered: defaults, then an optional YAML or TOML file,
//! then environment variables (a `.env` file is loaded into the environment
//! first), then CLI flags. Later layers win.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use subman_storage_postgres::PostgresStoreConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// Close connections idle this long; 0 keeps them open
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Recycle connections after this long; 0 keeps them forever
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,

    /// Apply pending migrations on `serve`
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default = "default_false")]
    pub log_sql_queries: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Label echoed in total-cost responses
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            http: HttpConfig::default(),
            billing: BillingConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            max_lifetime_secs: default_max_lifetime_secs(),
            run_migrations: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_sql_queries: false,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML or TOML file
    ///
    /// # Errors
    /// - `ConfigError::FileRead` if the file cannot be read
    /// - `ConfigError::ParseError` for invalid YAML/TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileRead(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(format!("YAML parse error: {}", e)))?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Database settings (no SUBMAN_ prefix, matches the usual deployment convention)
        if let Ok(val) = std::env::var("DATABASE_URL") {
            self.database.url = val;
        }

        override_from_env("SUBMAN_DB_MAX_CONNECTIONS", &mut self.database.max_connections);
        override_from_env("SUBMAN_DB_MIN_CONNECTIONS", &mut self.database.min_connections);
        override_from_env(
            "SUBMAN_DB_ACQUIRE_TIMEOUT_SECS",
            &mut self.database.acquire_timeout_secs,
        );
        override_from_env(
            "SUBMAN_DB_IDLE_TIMEOUT_SECS",
            &mut self.database.idle_timeout_secs,
        );
        override_from_env(
            "SUBMAN_DB_MAX_LIFETIME_SECS",
            &mut self.database.max_lifetime_secs,
        );

        if let Ok(val) = std::env::var("SUBMAN_RUN_MIGRATIONS")
            && let Ok(enabled) = val.parse::<bool>()
        {
            self.database.run_migrations = enabled;
        }

        // Server settings; SUBMAN_PORT wins over the generic PORT
        for key in ["PORT", "SUBMAN_PORT"] {
            if let Ok(val) = std::env::var(key) {
                match val.parse::<u16>() {
                    Ok(port) => self.port = port,
                    Err(_) => eprintln!("Warning: Invalid {} '{}', ignoring", key, val),
                }
            }
        }

        if let Ok(val) = std::env::var("SUBMAN_HOST") {
            self.host = val;
        }

        // Logging settings
        if let Ok(val) = std::env::var("SUBMAN_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("SUBMAN_LOG_FORMAT") {
            match val.to_lowercase().as_str() {
                "text" => self.logging.format = LogFormat::Text,
                "json" => self.logging.format = LogFormat::Json,
                _ => eprintln!("Warning: Invalid SUBMAN_LOG_FORMAT '{}', using default", val),
            }
        }

        if let Ok(val) = std::env::var("SUBMAN_LOG_SQL_QUERIES")
            && let Ok(enabled) = val.parse::<bool>()
        {
            self.logging.log_sql_queries = enabled;
        }

        // HTTP settings
        override_from_env(
            "SUBMAN_REQUEST_TIMEOUT_SECS",
            &mut self.http.request_timeout_secs,
        );
        override_from_env(
            "SUBMAN_SHUTDOWN_TIMEOUT_SECS",
            &mut self.http.shutdown_timeout_secs,
        );

        // Billing settings
        if let Ok(val) = std::env::var("SUBMAN_CURRENCY") {
            self.billing.currency = val;
        }
    }

    /// Check the settings every command relies on
    ///
    /// # Errors
    /// - `ConfigError::ValidationError` describing the first invalid field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url is required (set DATABASE_URL)".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::ValidationError(
                "port must be non-zero".to_string(),
            ));
        }
        if self.database.max_connections == 0
            || self.database.min_connections > self.database.max_connections
        {
            return Err(ConfigError::ValidationError(format!(
                "database pool bounds are invalid (min {}, max {})",
                self.database.min_connections, self.database.max_connections
            )));
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "http.request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.billing.currency.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "billing.currency must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Connection pool settings for the PostgreSQL store
    pub fn store_config(&self) -> PostgresStoreConfig {
        PostgresStoreConfig::default()
            .with_max_connections(self.database.max_connections)
            .with_min_connections(self.database.min_connections)
            .with_acquire_timeout(Duration::from_secs(self.database.acquire_timeout_secs))
            .with_idle_timeout(non_zero_secs(self.database.idle_timeout_secs))
            .with_max_lifetime(non_zero_secs(self.database.max_lifetime_secs))
            .with_run_migrations(self.database.run_migrations)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.http.shutdown_timeout_secs)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File read error
    #[error("Failed to read config: {0}")]
    FileRead(String),

    /// Parse error
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Replace `target` with a parsed env value, keeping it when the value is invalid
fn override_from_env<T>(key: &str, target: &mut T)
where
    T: std::str::FromStr + std::fmt::Display,
{
    if let Ok(val) = std::env::var(key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => eprintln!("Warning: Invalid {} '{}', using {}", key, val, target),
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_idle_timeout_secs() -> u64 {
    600
}

fn default_max_lifetime_secs() -> u64 {
    1800
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_shutdown_timeout_secs() -> u64 {
    60
}

fn default_currency() -> String {
    "RUB".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}
