use crate::{ValidationMode, performance::DEFAULT_SLOW_REQUEST_THRESHOLD};
use core_config::{ConfigError, FromEnv, env_parse};
use std::time::Duration;

/// Settings shared by every pipeline built for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub slow_request_threshold: Duration,
    pub validation_mode: ValidationMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            slow_request_threshold: DEFAULT_SLOW_REQUEST_THRESHOLD,
            validation_mode: ValidationMode::default(),
        }
    }
}

impl FromEnv for PipelineConfig {
    /// - SLOW_REQUEST_THRESHOLD_MS: defaults to 500
    /// - VALIDATION_MODE: `result` (default) or `raise`
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            slow_request_threshold: Duration::from_millis(env_parse(
                "SLOW_REQUEST_THRESHOLD_MS",
                "500",
            )?),
            validation_mode: env_parse("VALIDATION_MODE", "result")?,
        })
    }
}
