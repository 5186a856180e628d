//! Route composition and the readiness probe.

use crate::config::Config;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::server::{HealthCheckFuture, create_router, health_router, run_health_checks};
use database::postgres::check_health;

/// The whole app: `/api` routes, docs, `/health` and `/ready`.
pub fn app(state: &AppState, config: &Config) -> Router {
    let api_routes = domain_todos::handlers::router(state.todos.clone());

    create_router::<ApiDoc>(api_routes, &config.cors)
        .merge(health_router(config.app))
        .merge(ready_router(state.clone()))
}

/// `GET /ready`: 200 once the store answers, 503 otherwise.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(state)
}

async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store: HealthCheckFuture<'_> = match &state.db {
        Some(db) => Box::pin(async move {
            check_health(db)
                .await
                .map_err(|e| format!("Database check failed: {}", e))
        }),
        None => Box::pin(async { Ok(()) }),
    };

    run_health_checks(vec![("store", store)]).await
}
