//! HTTP surface for the orchestrator.
//!
//! `POST /chat` carries one user message; `GET /healthz` reports liveness and
//! the number of live sessions.

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

use domain::{ChatMode, ChatReply};

use crate::orchestrator::{ConversationOrchestrator, OrchestratorError};

/// Inbound message body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Build the router with permissive CORS for browser front-ends
pub fn router(orchestrator: ConversationOrchestrator) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/chat", post(chat))
        .layer(cors)
        .with_state(orchestrator)
}

async fn chat(
    State(orchestrator): State<ConversationOrchestrator>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let session_id = request.session_id.unwrap_or_default();
    let text = request.text.unwrap_or_default();
    let mode = ChatMode::from_request(request.mode.as_deref());

    let reply = orchestrator.handle(&session_id, &text, mode).await?;
    Ok(Json(reply))
}

async fn healthz(State(orchestrator): State<ConversationOrchestrator>) -> Json<serde_json::Value> {
    let sessions = orchestrator.sessions().len().await;
    Json(json!({ "status": "ok", "sessions": sessions }))
}

/// Maps orchestrator failures onto HTTP status codes
pub struct ApiError(OrchestratorError);

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            OrchestratorError::MissingSessionId => {
                warn!("Rejected request without sessionId");
                StatusCode::BAD_REQUEST
            }
            OrchestratorError::LanguageModel { .. } => {
                error!("{}", self.0);
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
