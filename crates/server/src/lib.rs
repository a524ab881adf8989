//! Server crate for the MoodyMovie recommender.
//!
//! This crate contains the orchestrator that walks a conversation from
//! emotion exploration to a movie recommendation, the session store it
//! keeps state in, and the HTTP surface in front of it.

pub mod config;
pub mod http;
pub mod orchestrator;
pub mod prompts;
pub mod sampling;
pub mod session;

pub use config::{ServerConfig, ServiceConfig};
pub use orchestrator::{ConversationOrchestrator, OrchestratorError};
pub use session::{SessionHandle, SessionStore};
