//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through the environment; a `.env`
//! file in the working directory is loaded first by the binaries.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use tracing::{debug, info};

use catalog_client::TmdbClient;
use domain::EmotionGenreTable;
use emotion_client::EmotionServiceClient;
use llm_client::{LlmConfig, OpenAiChatClient};

use crate::orchestrator::ConversationOrchestrator;
use crate::session::SessionStore;

/// Settings for the outbound services and the conversation state
#[derive(Debug, Clone, Args)]
pub struct ServiceConfig {
    /// API key for the chat completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Model identifier sent with each completion request
    #[arg(long, env = "OPENAI_MODEL", default_value = llm_client::DEFAULT_MODEL)]
    pub openai_model: String,

    /// Base URL of the chat completion API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = llm_client::DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// Base URL of the sub-emotion inference service
    #[arg(long, env = "FASTAPI_BASE_URL", default_value = emotion_client::DEFAULT_BASE_URL)]
    pub emotion_service_url: String,

    /// TMDB API key; leave unset to disable catalog lookups
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub tmdb_api_key: Option<String>,

    /// Base URL of the TMDB API
    #[arg(long, env = "TMDB_BASE_URL", default_value = catalog_client::DEFAULT_BASE_URL)]
    pub tmdb_base_url: String,

    /// JSON file replacing the built-in emotion → genre table
    #[arg(long, env = "MOODY_GENRE_TABLE")]
    pub genre_table: Option<PathBuf>,

    /// Drop sessions idle for this many seconds (0 keeps them forever)
    #[arg(long, env = "MOODY_SESSION_IDLE_SECS", default_value_t = 3600)]
    pub session_idle_secs: u64,

    /// Timeout applied to every outbound request
    #[arg(long, env = "MOODY_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl ServiceConfig {
    pub fn session_idle_timeout(&self) -> Option<Duration> {
        (self.session_idle_secs > 0).then(|| Duration::from_secs(self.session_idle_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn load_genre_table(&self) -> Result<EmotionGenreTable> {
        EmotionGenreTable::load_or_builtin(self.genre_table.as_deref())
            .context("Failed to load emotion genre table")
    }

    /// Build the orchestrator and all of its collaborators
    pub fn build_orchestrator(&self) -> Result<ConversationOrchestrator> {
        let timeout = self.request_timeout();
        let genres = self.load_genre_table()?;

        let llm = OpenAiChatClient::new(
            LlmConfig::new(self.openai_api_key.clone())
                .with_model(self.openai_model.clone())
                .with_base_url(self.openai_base_url.clone())
                .with_timeout(timeout),
        )
        .context("Failed to create language model client")?;
        info!("Using language model {} at {}", llm.model(), llm.base_url());

        let classifier = EmotionServiceClient::new(self.emotion_service_url.clone(), timeout)
            .context("Failed to create emotion service client")?;
        info!("Using emotion service at {}", classifier.service_address());

        let catalog =
            TmdbClient::new(self.tmdb_api_key.clone(), self.tmdb_base_url.clone(), timeout)
                .context("Failed to create TMDB client")?;
        debug!("TMDB catalog configured: {}", catalog.is_configured());

        let sessions = Arc::new(SessionStore::new(self.session_idle_timeout()));

        Ok(ConversationOrchestrator::new(
            sessions,
            Arc::new(llm),
            Arc::new(classifier),
            Arc::new(catalog),
            genres,
        ))
    }
}

/// MoodyMovie HTTP server
#[derive(Debug, Clone, Parser)]
#[command(name = "moody-movie-server")]
#[command(about = "Mood-based movie recommendation chat server", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "MOODY_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// How often idle sessions are reaped, in seconds
    #[arg(long, env = "MOODY_REAP_INTERVAL_SECS", default_value_t = 60)]
    pub reap_interval_secs: u64,

    #[command(flatten)]
    pub services: ServiceConfig,
}

impl ServerConfig {
    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from([
            "moody-movie-server",
            "--openai-api-key",
            "sk-test",
        ])
        .unwrap();

        assert_eq!(config.bind, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.reap_interval(), Duration::from_secs(60));
        let services = &config.services;
        assert_eq!(services.openai_model, llm_client::DEFAULT_MODEL);
        assert_eq!(services.session_idle_timeout(), Some(Duration::from_secs(3600)));
        assert_eq!(services.request_timeout(), Duration::from_secs(30));
        assert!(services.genre_table.is_none());
    }

    #[test]
    fn test_zero_idle_disables_expiry() {
        let config = ServerConfig::try_parse_from([
            "moody-movie-server",
            "--openai-api-key",
            "sk-test",
            "--session-idle-secs",
            "0",
        ])
        .unwrap();

        assert_eq!(config.services.session_idle_timeout(), None);
    }

    #[test]
    fn test_build_orchestrator_with_builtin_table() {
        let config = ServerConfig::try_parse_from([
            "moody-movie-server",
            "--openai-api-key",
            "sk-test",
            "--tmdb-base-url",
            "http://localhost:1",
        ])
        .unwrap();

        assert!(config.services.build_orchestrator().is_ok());
    }

    #[test]
    fn test_bad_genre_table_fails_startup() {
        let config = ServerConfig::try_parse_from([
            "moody-movie-server",
            "--openai-api-key",
            "sk-test",
            "--genre-table",
            "/nonexistent/genres.json",
        ])
        .unwrap();

        let err = config.services.build_orchestrator().err().expect("expected build_orchestrator to fail");
        assert!(err.to_string().contains("genre table"));
    }
}
