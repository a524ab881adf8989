//! Sub-emotion classifier client.
//!
//! This crate calls the auxiliary inference service that refines a primary
//! emotion into a finer-grained sub-emotion. It handles:
//! - Building the `{text, rep_emotion}` request
//! - Parsing the `{emotion, sub_emotion}` response
//! - Degrading to "no sub-emotion" on any failure
//!
//! The classifier is optional enrichment, so [`SubEmotionClassifier`] never
//! returns an error. Callers that care can inspect
//! [`SubEmotionOutcome::Degraded`] to see why nothing came back.

use std::time::Duration;

use async_trait::async_trait;
use domain::Emotion;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Default address of the inference service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Errors that can occur when interacting with the inference service
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Failed to reach emotion service: {0}")]
    Request(String),

    #[error("Emotion service returned status {0}")]
    Status(u16),

    #[error("Invalid response from emotion service: {0}")]
    InvalidResponse(String),
}

/// Result of a sub-emotion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubEmotionOutcome {
    /// The service answered
    Classified {
        emotion: String,
        sub_emotion: Option<String>,
    },
    /// The service could not be used; carries the caller's primary emotion
    Degraded { emotion: Emotion, reason: String },
}

impl SubEmotionOutcome {
    pub fn sub_emotion(&self) -> Option<&str> {
        match self {
            SubEmotionOutcome::Classified { sub_emotion, .. } => sub_emotion.as_deref(),
            SubEmotionOutcome::Degraded { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SubEmotionOutcome::Degraded { .. })
    }
}

/// Anything that can refine a primary emotion.
#[async_trait]
pub trait SubEmotionClassifier: Send + Sync {
    async fn predict_sub_emotion(&self, text: &str, primary: Emotion) -> SubEmotionOutcome;
}

#[derive(Serialize)]
struct EmotionRequest<'a> {
    text: &'a str,
    rep_emotion: Emotion,
}

#[derive(Debug, Deserialize)]
struct EmotionResponse {
    emotion: String,
    #[serde(default)]
    sub_emotion: Option<String>,
}

/// HTTP client for the `/emotion` endpoint.
#[derive(Debug, Clone)]
pub struct EmotionServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl EmotionServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::ClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn service_address(&self) -> &str {
        &self.base_url
    }

    async fn request(
        &self,
        text: &str,
        primary: Emotion,
    ) -> Result<EmotionResponse, ClassifierError> {
        let url = format!("{}/emotion", self.base_url);
        debug!("Requesting sub-emotion for {} from {}", primary, url);

        let response = self
            .client
            .post(&url)
            .json(&EmotionRequest {
                text,
                rep_emotion: primary,
            })
            .send()
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifierError::Status(response.status().as_u16()));
        }

        response
            .json::<EmotionResponse>()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl SubEmotionClassifier for EmotionServiceClient {
    async fn predict_sub_emotion(&self, text: &str, primary: Emotion) -> SubEmotionOutcome {
        match self.request(text, primary).await {
            Ok(response) => SubEmotionOutcome::Classified {
                emotion: response.emotion,
                sub_emotion: response.sub_emotion,
            },
            Err(err) => {
                warn!("Sub-emotion classification degraded: {}", err);
                SubEmotionOutcome::Degraded {
                    emotion: primary,
                    reason: err.to_string(),
                }
            }
        }
    }
}
