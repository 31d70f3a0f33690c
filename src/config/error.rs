//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),

    #[error("Gateway attempts must be at least 1")]
    InvalidAttempts,

    #[error("Max tokens must be at least 1")]
    InvalidMaxTokens,

    #[error("Max input chars must be at least 1")]
    InvalidInputLimit,

    #[error(
        "Gateway budget of {budget_secs}s exceeds the {request_timeout_secs}s request timeout"
    )]
    GatewayBudgetExceedsRequestTimeout {
        budget_secs: u64,
        request_timeout_secs: u64,
    },
}
