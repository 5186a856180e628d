use crate::extractors::USER_ID_HEADER;
use axum::http::{HeaderName, HeaderValue, Method, header};
use core_config::{ConfigError, FromEnv};
use std::env;
use std::time::Duration;
use tower_http::cors::CorsLayer;

/// Which browser origins may call the API.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Any origin. Development only.
    #[default]
    Permissive,
    /// A single allowed origin.
    Origin(HeaderValue),
}

impl CorsConfig {
    pub fn layer(&self) -> CorsLayer {
        match self {
            CorsConfig::Permissive => create_permissive_cors_layer(),
            CorsConfig::Origin(origin) => create_cors_layer(origin.clone()),
        }
    }
}

impl FromEnv for CorsConfig {
    /// - CORS_ALLOWED_ORIGIN: unset means permissive
    fn from_env() -> Result<Self, ConfigError> {
        match env::var("CORS_ALLOWED_ORIGIN") {
            Ok(origin) => HeaderValue::from_str(origin.trim())
                .map(CorsConfig::Origin)
                .map_err(|e| ConfigError::ParseError {
                    key: "CORS_ALLOWED_ORIGIN".to_string(),
                    details: e.to_string(),
                }),
            Err(_) => Ok(CorsConfig::Permissive),
        }
    }
}

/// CORS layer for one allowed origin.
///
/// Allows the usual REST verbs, JSON content negotiation and the
/// `x-user-id` actor header. Preflight responses are cached for an hour.
pub fn create_cors_layer(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(Duration::from_secs(3600))
}

/// Allows any origin - **DO NOT USE IN PRODUCTION**.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
