//! Common library for the music catalog
//!
//! This crate provides the database plumbing shared by the catalog
//! services: connection configuration, SQLite pool initialisation, schema
//! migrations and health checks.
//!
//! ```rust,no_run
//! use musica_common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;

pub use database::{DatabaseConfig, health_check, init_memory_pool, init_pool, run_migrations};
pub use error::{DatabaseError, DatabaseResult};
