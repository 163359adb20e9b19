//! # Database Pool Management
//!
//! Opening the SQLite store and handing out repositories.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Lifecycle                                    │
//! │                                                                         │
//! │  DbConfig::from_env() / DbConfig::new(path) / DbConfig::in_memory()     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← open pool + run migrations              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐                                │                           │
//! │  │  │Conn1│   max_connections = 1          │                           │
//! │  │  └─────┘   callers queue on acquire     │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ├── db.products() ──► ProductRepository                           │
//! │       ├── db.sales()    ──► SaleRepository                              │
//! │       ▼                                                                 │
//! │  db.close().await                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Single Writer
//! One connection means statements from different callers never interleave
//! inside a transaction. Repositories that open a transaction must run every
//! statement on it (`&mut *tx`), never on the pool, or they would wait for
//! the connection they already hold.

use directories::ProjectDirs;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;

/// Overrides the database file location.
pub const ENV_DB_PATH: &str = "ABARROTES_DB_PATH";
/// Overrides the pool size.
pub const ENV_MAX_CONNECTIONS: &str = "ABARROTES_DB_MAX_CONNECTIONS";
/// Overrides the acquire timeout, in whole seconds.
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "ABARROTES_DB_CONNECT_TIMEOUT_SECS";

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/abarrotes.db")
///     .connect_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 1 (single writer)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps it forever.
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the database file at `path`.
    ///
    /// The file (and its parent directory) is created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// The database lives as long as its single connection, so that
    /// connection is never reaped.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    /// Builds a configuration from the process environment.
    ///
    /// ```text
    /// ABARROTES_DB_PATH                   file path (default: default_path())
    /// ABARROTES_DB_MAX_CONNECTIONS        positive integer (default: 1)
    /// ABARROTES_DB_CONNECT_TIMEOUT_SECS   seconds (default: 30)
    /// ```
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = match lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => Self::default_path()?,
        };

        let mut config = DbConfig::new(path);

        if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
            let max = parse_positive(ENV_MAX_CONNECTIONS, &raw)?;
            config.max_connections = max;
            config.min_connections = config.min_connections.min(max);
        }

        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT_SECS) {
            let secs = parse_positive(ENV_CONNECT_TIMEOUT_SECS, &raw)?;
            config.connect_timeout = Duration::from_secs(u64::from(secs));
        }

        Ok(config)
    }

    /// Platform data directory location of the database.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.abarrotes.pos/abarrotes.db`
    /// - **Windows**: `%APPDATA%\abarrotes\pos\data\abarrotes.db`
    /// - **Linux**: `~/.local/share/pos/abarrotes.db`
    pub fn default_path() -> DbResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "abarrotes", "pos").ok_or_else(|| {
            DbError::InvalidConfig("could not determine the app data directory".to_string())
        })?;

        Ok(dirs.data_dir().join("abarrotes.db"))
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// True for `:memory:` configurations.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(MEMORY_PATH)
    }
}

fn parse_positive(key: &str, raw: &str) -> DbResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(DbError::InvalidConfig(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}

// =============================================================================
// Database
// =============================================================================

/// The store: owns the pool and hands out repositories.
///
/// Cloning is cheap (the pool is reference counted); every clone talks to
/// the same connection.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::from_env()?).await?;
///
/// let id = db.products().create(NewProduct::new("Coca-Cola 600ml", 1500, 2200)).await?;
/// let mut cart = Cart::new();
/// cart.add(&db.products().get(id).await?)?;
/// let sale = db.sales().commit(&cart).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and runs migrations (if enabled).
    ///
    /// ## SQLite Settings
    /// - Foreign keys enabled (off by default in SQLite)
    /// - File databases: WAL journal, NORMAL synchronous
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let in_memory = config.is_in_memory();

        let connect_options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                .foreign_keys(true)
        } else {
            if let Some(parent) = config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                }
            }

            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .foreign_keys(true)
                .create_if_missing(true)
        };

        debug!(in_memory, "Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);

        if in_memory {
            pool_options = pool_options.max_lifetime(None::<Duration>);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Called by `new()` unless disabled.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// `(total, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the Catalog Store.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Returns the Sales Ledger.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Closes the pool. Later operations fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks that the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use abarrotes_core::NewProduct;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.migration_status().await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.run_migrations().await.unwrap();
        assert_eq!(db.migration_status().await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn test_closed_database_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
        assert!(db.products().list().await.is_err());
    }

    #[tokio::test]
    async fn test_file_database_is_durable() {
        let dir = std::env::temp_dir().join(format!(
            "abarrotes-db-test-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let path = dir.join("nested").join("abarrotes.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let id = db
            .products()
            .create(NewProduct::new("Azúcar 1kg", 2100, 2800))
            .await
            .unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        let product = reopened.products().get(id).await.unwrap();
        assert_eq!(product.name, "Azúcar 1kg");
        reopened.close().await;

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[test]
    fn test_config_defaults_to_single_writer() {
        let config = DbConfig::new("/tmp/test.db");
        assert_eq!(config.max_connections, 1);
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_DB_PATH, "/srv/tienda/abarrotes.db"),
            (ENV_MAX_CONNECTIONS, "4"),
            (ENV_CONNECT_TIMEOUT_SECS, "7"),
        ]
        .into_iter()
        .collect();

        let config = DbConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/srv/tienda/abarrotes.db"));
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.connect_timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_config_from_lookup_rejects_bad_numbers() {
        for bad in ["0", "-1", "many", ""] {
            let result = DbConfig::from_lookup(|k| match k {
                ENV_DB_PATH => Some("/tmp/x.db".to_string()),
                ENV_MAX_CONNECTIONS => Some(bad.to_string()),
                _ => None,
            });
            assert!(
                matches!(result, Err(DbError::InvalidConfig(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_default_path_file_name() {
        // Environments without a home directory cannot derive a default.
        if let Ok(path) = DbConfig::default_path() {
            assert_eq!(path.file_name().unwrap(), "abarrotes.db");
        }
    }
}
