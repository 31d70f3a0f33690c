//! Journey Builder server binary.
//!
//! Loads configuration, installs tracing, loads the knowledge tables, wires
//! the orchestrator to the Gemini gateway and serves the HTTP API.

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use journey_builder::adapters::ai::GeminiProvider;
use journey_builder::adapters::http::{build_app, ChatAppState};
use journey_builder::application::ChatOrchestrator;
use journey_builder::config::{AppConfig, ConfigError, LogFormat, ServerConfig, ValidationError};
use journey_builder::domain::knowledge::{KnowledgeLoadError, KnowledgeResolver};
use journey_builder::ports::AIError;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("knowledge tables failed to load: {0}")]
    Knowledge(#[from] KnowledgeLoadError),

    #[error("model gateway setup failed: {0}")]
    Provider(#[from] AIError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for StartupError {
    fn from(err: ValidationError) -> Self {
        Self::Config(ConfigError::ValidationFailed(err))
    }
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let knowledge = config.knowledge.load()?;
    tracing::info!(
        source = %config.knowledge.source_label(),
        frameworks = knowledge.framework_count(),
        verticals = knowledge.vertical_count(),
        "knowledge tables loaded"
    );
    let resolver = Arc::new(KnowledgeResolver::new(Arc::new(knowledge)));

    let gemini = config
        .ai
        .gemini()
        .ok_or(ValidationError::MissingRequired("GEMINI_API_KEY"))?;
    let provider = Arc::new(GeminiProvider::new(gemini)?);

    let orchestrator = ChatOrchestrator::new(provider, resolver)
        .with_settings(config.chat_settings())
        .with_retry_policy(config.ai.retry_policy());

    let app = build_app(
        ChatAppState::new(Arc::new(orchestrator)),
        &config.server.cors_origins_list(),
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        model = %config.ai.model,
        "journey-builder listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
