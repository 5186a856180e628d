use axum_helpers::server::serve;
use core_config::tracing::{init_tracing, install_color_eyre};
use database::{DatabaseError, RetryConfig, postgres};
use domain_todos::{
    EventDispatcher, InMemoryTodoStore, LoggingEventSubscriber, PgTodoStore, TodoService,
    create_schema,
};
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::{Config, StoreBackend};
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation, so startup errors are reported nicely
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let dispatcher = EventDispatcher::new().subscribe(LoggingEventSubscriber);

    let state = match (config.store, config.database.clone()) {
        (StoreBackend::Postgres, Some(database)) => {
            let db = postgres::connect_from_config_with_retry(database, RetryConfig::default())
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
            create_schema(&db)
                .await
                .map_err(|e| DatabaseError::SchemaError(e.to_string()))?;

            let store = Arc::new(PgTodoStore::new(db.clone()));
            AppState {
                todos: Arc::new(TodoService::new(store, dispatcher, &config.pipeline)),
                db: Some(db),
            }
        }
        (StoreBackend::Postgres, None) => {
            eyre::bail!("TODO_STORE=postgres requires DATABASE_URL")
        }
        (StoreBackend::Memory, _) => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            let store = Arc::new(InMemoryTodoStore::new());
            AppState {
                todos: Arc::new(TodoService::new(store, dispatcher, &config.pipeline)),
                db: None,
            }
        }
    };

    let app = api::app(&state, &config);

    info!(
        store = %config.store,
        "Starting {} v{}", config.app.name, config.app.version
    );

    serve(app, &config.server, async move {
        if let Some(db) = state.db {
            info!("Shutting down: closing database connections");
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Todo API shutdown complete");
    Ok(())
}
