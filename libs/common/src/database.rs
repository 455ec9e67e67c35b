//! Database module for handling SQLite connections and operations
//!
//! This module provides connection pooling, configuration, schema
//! migrations and health checks for the catalog database.

use crate::error::{DatabaseError, DatabaseResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::{env, str::FromStr, time::Duration};
use tracing::info;

/// Default database location, created on first start
pub const DEFAULT_DATABASE_URL: &str = "sqlite://musica.db?mode=rwc";

/// Schema of the catalog. Every statement is idempotent.
///
/// `favoritos` references both parents without `ON DELETE CASCADE`: a parent
/// row can only be removed after its favoritos are gone, so a cascade that
/// skipped the join rows fails instead of leaving dangling references.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS usuarios (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nombre TEXT NOT NULL,
        correo TEXT NOT NULL UNIQUE COLLATE NOCASE,
        fecha_registro TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS canciones (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        titulo TEXT NOT NULL,
        artista TEXT NOT NULL,
        album TEXT,
        duracion INTEGER NOT NULL CHECK (duracion BETWEEN 1 AND 3600),
        anio INTEGER NOT NULL CHECK (anio >= 1900),
        genero TEXT,
        fecha_creacion TEXT NOT NULL,
        titulo_busqueda TEXT NOT NULL,
        artista_busqueda TEXT NOT NULL,
        album_busqueda TEXT,
        genero_busqueda TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS favoritos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        id_usuario INTEGER NOT NULL REFERENCES usuarios(id),
        id_cancion INTEGER NOT NULL REFERENCES canciones(id),
        fecha_marcado TEXT NOT NULL,
        UNIQUE (id_usuario, id_cancion)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_usuarios_orden ON usuarios (fecha_registro, id)",
    "CREATE INDEX IF NOT EXISTS idx_canciones_orden ON canciones (fecha_creacion, id)",
    "CREATE INDEX IF NOT EXISTS idx_favoritos_usuario ON favoritos (id_usuario)",
    "CREATE INDEX IF NOT EXISTS idx_favoritos_cancion ON favoritos (id_cancion)",
];

/// Database configuration struct
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection acquire timeout in seconds
    pub connection_timeout: u64,
}

impl DatabaseConfig {
    /// Create a new DatabaseConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DATABASE_URL`: SQLite connection URL (default: `sqlite://musica.db?mode=rwc`)
    /// - `DATABASE_MAX_CONNECTIONS`: Maximum number of connections (default: 5)
    /// - `DATABASE_CONNECTION_TIMEOUT`: Acquire timeout in seconds (default: 30)
    pub fn from_env() -> DatabaseResult<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        if database_url.trim().is_empty() {
            return Err(DatabaseError::Configuration(
                "DATABASE_URL must not be empty".to_string(),
            ));
        }

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let connection_timeout = env::var("DATABASE_CONNECTION_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            database_url,
            max_connections,
            connection_timeout,
        })
    }

    /// Whether the URL points at a private in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:")
    }
}

/// Initialize a SQLite connection pool
///
/// In-memory URLs are routed to [`init_memory_pool`], since every extra
/// connection to `:memory:` would open a different, empty database.
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// * `DatabaseResult<SqlitePool>` - SQLite connection pool or error
pub async fn init_pool(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    if config.is_in_memory() {
        return init_memory_pool().await;
    }

    info!("Initializing database connection pool");

    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| DatabaseError::Configuration(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect_with(options)
        .await
        .map_err(DatabaseError::Connection)?;

    info!("Database connection pool initialized successfully");
    Ok(pool)
}

/// Initialize a pool over a private in-memory database
///
/// The pool holds exactly one connection that never expires, so the data
/// lives as long as the pool.
pub async fn init_memory_pool() -> DatabaseResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| DatabaseError::Configuration(format!("Invalid database URL: {}", e)))?
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(DatabaseError::Connection)
}

/// Create the catalog schema if it does not exist yet
pub async fn run_migrations(pool: &SqlitePool) -> DatabaseResult<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    }

    tx.commit()
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    info!("Database schema is up to date");
    Ok(())
}

/// Check database connectivity
///
/// # Arguments
///
/// * `pool` - SQLite connection pool
///
/// # Returns
///
/// * `DatabaseResult<bool>` - True if connection is successful
pub async fn health_check(pool: &SqlitePool) -> DatabaseResult<bool> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(DatabaseError::Query)?;

    Ok(true)
}
