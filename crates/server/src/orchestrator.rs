//! # Conversation Orchestrator
//!
//! This module drives a conversation from first message to recommendation:
//! 1. Look up (or create) the session and lock it for the request
//! 2. Chat mode: answer with stored context, no analysis
//! 3. Emotion mode, turns 1-2: ask one clarifying question
//! 4. Emotion mode, turn 3+: summarize the history
//! 5. Classify the summary into one of seven emotions
//! 6. Ask the inference service for a sub-emotion
//! 7. Fetch a candidate pool for the emotion's genres
//! 8. Sample up to five titles and store them on the session

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use catalog_client::MovieCatalog;
use domain::{
    ChatMode, ChatReply, Emotion, EmotionGenreTable, FinalReply, MAX_RECOMMENDATIONS, Session,
};
use emotion_client::SubEmotionClassifier;
use llm_client::{ChatModel, LlmError};

use crate::prompts;
use crate::sampling::sample_recommendations;
use crate::session::SessionStore;

/// Errors surfaced to the caller of [`ConversationOrchestrator::handle`]
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("sessionId is required")]
    MissingSessionId,

    #[error("Language model call failed during {stage}: {source}")]
    LanguageModel {
        stage: &'static str,
        #[source]
        source: LlmError,
    },
}

/// Main orchestrator that coordinates the conversation flow
#[derive(Clone)]
pub struct ConversationOrchestrator {
    sessions: Arc<SessionStore>,
    llm: Arc<dyn ChatModel>,
    classifier: Arc<dyn SubEmotionClassifier>,
    catalog: Arc<dyn MovieCatalog>,
    genres: Arc<EmotionGenreTable>,
}

impl ConversationOrchestrator {
    pub fn new(
        sessions: Arc<SessionStore>,
        llm: Arc<dyn ChatModel>,
        classifier: Arc<dyn SubEmotionClassifier>,
        catalog: Arc<dyn MovieCatalog>,
        genres: EmotionGenreTable,
    ) -> Self {
        Self {
            sessions,
            llm,
            classifier,
            catalog,
            genres: Arc::new(genres),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Main entry point: process one user message
    ///
    /// # Arguments
    /// * `session_id` - Conversation key; blank ids are rejected
    /// * `text` - Latest user utterance (may be empty)
    /// * `mode` - Free chat or emotion exploration
    pub async fn handle(
        &self,
        session_id: &str,
        text: &str,
        mode: ChatMode,
    ) -> Result<ChatReply, OrchestratorError> {
        if session_id.trim().is_empty() {
            return Err(OrchestratorError::MissingSessionId);
        }

        let handle = self.sessions.get_or_create(session_id).await;
        // Held for the whole request so same-session messages are serialized
        let mut session = handle.lock().await;

        match mode {
            ChatMode::Chat => self.chat(session_id, &session, text).await,
            ChatMode::Emotion => {
                let turn = session.record_turn(text);
                if session.is_ready_to_finalize() {
                    info!("Session {} reached turn {}, finalizing", session_id, turn);
                    self.finalize(session_id, &mut session).await
                } else {
                    debug!("Session {} exploring at turn {}", session_id, turn);
                    self.explore(&session).await
                }
            }
        }
    }

    /// Free movie chat using the stored summary and recommendations
    async fn chat(
        &self,
        session_id: &str,
        session: &Session,
        text: &str,
    ) -> Result<ChatReply, OrchestratorError> {
        if !session.recommended {
            debug!("Session {} chatting before any recommendation", session_id);
        }
        let user = prompts::chat_user_prompt(session, text);
        let reply = self.ask(prompts::CHAT_SYSTEM_PROMPT, &user, "chat").await?;
        Ok(ChatReply::message(reply))
    }

    /// Ask one clarifying question about the user's state
    async fn explore(&self, session: &Session) -> Result<ChatReply, OrchestratorError> {
        let user = prompts::explore_user_prompt(session);
        let reply = self
            .ask(prompts::EXPLORE_SYSTEM_PROMPT, &user, "exploration")
            .await?;
        Ok(ChatReply::message(reply))
    }

    /// Terminal pipeline: summary → emotion → sub-emotion → pool → sample
    async fn finalize(
        &self,
        session_id: &str,
        session: &mut Session,
    ) -> Result<ChatReply, OrchestratorError> {
        let start_time = Instant::now();
        session.mark_finalized();

        let summary = self.summarize(session).await?;
        info!("Summarized session {}: {}", session_id, summary);

        let emotion = self.classify_emotion(&summary).await?;
        info!("Classified session {} as {}", session_id, emotion);

        let outcome = self.classifier.predict_sub_emotion(&summary, emotion).await;
        if outcome.is_degraded() {
            warn!("Session {} continuing without a sub-emotion", session_id);
        }
        let sub_emotion = outcome.sub_emotion().map(str::to_string);

        let pool = self.build_candidate_pool(emotion).await;
        info!(
            "Candidate pool for session {} has {} titles",
            session_id,
            pool.len()
        );

        if pool.is_empty() {
            warn!("No candidates for session {}", session_id);
            return Ok(ChatReply::Final(FinalReply {
                reply: prompts::NO_MOVIES_REPLY.to_string(),
                is_final: true,
                summary,
                emotion,
                sub_emotion,
                movies: Vec::new(),
            }));
        }

        let movies = {
            let mut rng = rand::thread_rng();
            sample_recommendations(pool, MAX_RECOMMENDATIONS, &mut rng)
        };
        let titles = movies.iter().map(|m| m.title.clone()).collect();
        session.record_recommendation(summary.clone(), titles);

        info!(
            "Recommended {} movies to session {} in {:.2?}",
            movies.len(),
            session_id,
            start_time.elapsed()
        );

        Ok(ChatReply::Final(FinalReply {
            reply: prompts::SUMMARY_READY_REPLY.to_string(),
            is_final: true,
            summary,
            emotion,
            sub_emotion,
            movies,
        }))
    }

    async fn summarize(&self, session: &Session) -> Result<String, OrchestratorError> {
        let user = prompts::summary_user_prompt(session);
        self.ask(prompts::SUMMARY_SYSTEM_PROMPT, &user, "summary")
            .await
    }

    /// Seven-way classification; unusable output falls back to [`Emotion::FALLBACK`]
    async fn classify_emotion(&self, summary: &str) -> Result<Emotion, OrchestratorError> {
        let raw = self
            .ask(&prompts::emotion_system_prompt(), summary, "emotion classification")
            .await?;

        let emotion = Emotion::from_model_output(&raw);
        if Emotion::from_label(raw.trim()).is_none() {
            warn!("Unrecognized emotion label {:?}, using {}", raw, emotion);
        }
        Ok(emotion)
    }

    async fn build_candidate_pool(&self, emotion: Emotion) -> Vec<String> {
        let genre_ids = self.genres.genres_for(emotion);
        debug!("Emotion {} maps to genres {:?}", emotion, genre_ids);
        self.catalog.fetch_top_movies_by_genres(genre_ids).await
    }

    async fn ask(
        &self,
        system: &str,
        user: &str,
        stage: &'static str,
    ) -> Result<String, OrchestratorError> {
        self.llm
            .complete(system, user)
            .await
            .map_err(|source| OrchestratorError::LanguageModel { stage, source })
    }
}
