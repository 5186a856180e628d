//! # Axum Helpers
//!
//! Shared HTTP plumbing for the API apps.
//!
//! - **[`server`]**: router assembly with OpenAPI UIs, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: JSON error bodies with stable error codes
//! - **[`extractors`]**: acting user and integer id path extractors
//! - **[`crud`]**: status mapping for mediator result envelopes
//!
//! ```ignore
//! use axum_helpers::{CorsConfig, create_router, health_router, serve};
//!
//! let app = create_router::<ApiDoc>(api_routes, &CorsConfig::from_env()?)
//!     .merge(health_router(app_info!()));
//! serve(app, &ServerConfig::from_env()?, async {}).await?;
//! ```

pub mod crud;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use crud::{CrudJson, status_code};
pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{Actor, IdPath, USER_ID_HEADER};
pub use http::{CorsConfig, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_router, health_router,
    run_health_checks, serve, shutdown_signal,
};
