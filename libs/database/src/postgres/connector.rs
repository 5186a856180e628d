use sea_orm::{Database, DatabaseConnection};
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};

pub async fn connect_from_config(config: PostgresConfig) -> DatabaseResult<DatabaseConnection> {
    let db = Database::connect(config.into_connect_options()).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// Connects with exponential backoff, for startup while the database may
/// still be coming up.
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    retry: RetryConfig,
) -> DatabaseResult<DatabaseConnection> {
    let options = config.into_connect_options();

    let db = retry_with_backoff(|| Database::connect(options.clone()), retry)
        .await
        .map_err(|(attempts, e)| DatabaseError::ConnectionFailed {
            attempts,
            reason: e.to_string(),
        })?;

    info!("Connected to PostgreSQL");
    Ok(db)
}
