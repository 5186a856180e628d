use axum_helpers::CorsConfig;
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;
use mediator::PipelineConfig;
use strum::{Display, EnumString};

pub use core_config::Environment;

/// Where todo data lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    Postgres,
    /// Process-local; data is lost on restart
    Memory,
}

/// Application configuration, composed from the shared config pieces.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub cors: CorsConfig,
    pub store: StoreBackend,
    /// Only read when `store` is `Postgres`
    pub database: Option<PostgresConfig>,
}

impl Config {
    /// - TODO_STORE: `postgres` (default) or `memory`
    /// - DATABASE_URL and DB_* when the store is postgres
    pub fn from_env() -> Result<Self, ConfigError> {
        let store: StoreBackend = env_parse("TODO_STORE", "postgres")?;
        let database = match store {
            StoreBackend::Postgres => Some(PostgresConfig::from_env()?),
            StoreBackend::Memory => None,
        };

        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            pipeline: PipelineConfig::from_env()?,
            cors: CorsConfig::from_env()?,
            store,
            database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_needs_no_database() {
        temp_env::with_vars(
            [
                ("TODO_STORE", Some("Memory")),
                ("DATABASE_URL", None::<&str>),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.store, StoreBackend::Memory);
                assert!(config.database.is_none());
                assert_eq!(config.app.name, "todo_api");
            },
        );
    }

    #[test]
    fn test_postgres_store_requires_database_url() {
        temp_env::with_vars(
            [("TODO_STORE", None::<&str>), ("DATABASE_URL", None::<&str>)],
            || {
                assert!(matches!(
                    Config::from_env(),
                    Err(ConfigError::MissingEnvVar(key)) if key == "DATABASE_URL"
                ));
            },
        );
    }

    #[test]
    fn test_unknown_store_is_parse_error() {
        temp_env::with_var("TODO_STORE", Some("redis"), || {
            assert!(matches!(
                Config::from_env(),
                Err(ConfigError::ParseError { .. })
            ));
        });
    }
}
