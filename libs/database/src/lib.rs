//! PostgreSQL connection management for the todo services.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::{RetryConfig, postgres};
//!
//! let config = postgres::PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, RetryConfig::default()).await?;
//! postgres::check_health(&db).await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};
