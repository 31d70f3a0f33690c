//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `JOURNEY_BUILDER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use journey_builder::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod chat;
mod error;
mod knowledge;
mod server;

pub use ai::AiConfig;
pub use chat::ChatConfig;
pub use error::{ConfigError, ValidationError};
pub use knowledge::KnowledgeConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

use crate::application::ChatSettings;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "JOURNEY_BUILDER";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, logging, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini gateway configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Knowledge table location
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Chat pipeline limits
    #[serde(default)]
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `JOURNEY_BUILDER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `JOURNEY_BUILDER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `JOURNEY_BUILDER__AI__GEMINI_API_KEY=...` -> `ai.gemini_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.chat.validate()?;

        // A request cut off by the HTTP timeout gets no gateway-failure body.
        let budget = self.ai.gateway_budget();
        if budget > self.server.request_timeout() {
            return Err(ValidationError::GatewayBudgetExceedsRequestTimeout {
                budget_secs: budget.as_secs_f64().ceil() as u64,
                request_timeout_secs: self.server.request_timeout_secs,
            });
        }
        Ok(())
    }

    /// Tunables handed to the chat orchestrator.
    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            temperature: self.ai.temperature,
            max_tokens: self.ai.max_tokens,
            max_history_messages: self.chat.max_history_messages,
            max_input_chars: self.chat.max_input_chars,
            gateway_timeout: self.ai.timeout(),
        }
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
