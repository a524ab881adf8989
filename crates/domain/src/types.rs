//! Core domain types for the conversation flow.
//!
//! This module defines the emotion taxonomy, the per-conversation session
//! model and the reply payloads that leave the service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// TMDB genre identifier (e.g. 18 = Drama)
pub type GenreId = u32;

/// Opaque caller-supplied conversation identifier
pub type SessionId = String;

/// Number of exploration turns after which the conversation is finalized
pub const FINALIZE_AFTER_TURNS: u32 = 3;

/// Maximum number of titles handed back in one recommendation
pub const MAX_RECOMMENDATIONS: usize = 5;

// =============================================================================
// Emotion Taxonomy
// =============================================================================

/// The seven primary emotion categories.
///
/// On the wire each variant is its Korean label; the language model is asked
/// to answer with exactly one of these labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    #[serde(rename = "탐구")]
    Curious,
    #[serde(rename = "분노")]
    Angry,
    #[serde(rename = "슬픔")]
    Sad,
    #[serde(rename = "행복")]
    Happy,
    #[serde(rename = "심심")]
    Bored,
    #[serde(rename = "불안")]
    Anxious,
    #[serde(rename = "스트레스")]
    Stressed,
}

impl Emotion {
    /// All labels, in the order they are listed to the language model
    pub const ALL: [Emotion; 7] = [
        Emotion::Curious,
        Emotion::Angry,
        Emotion::Sad,
        Emotion::Happy,
        Emotion::Bored,
        Emotion::Anxious,
        Emotion::Stressed,
    ];

    /// Label used whenever the model answers with something unusable
    pub const FALLBACK: Emotion = Emotion::Anxious;

    pub fn label(self) -> &'static str {
        match self {
            Emotion::Curious => "탐구",
            Emotion::Angry => "분노",
            Emotion::Sad => "슬픔",
            Emotion::Happy => "행복",
            Emotion::Bored => "심심",
            Emotion::Anxious => "불안",
            Emotion::Stressed => "스트레스",
        }
    }

    /// Exact, case-sensitive match against the seven labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == label)
    }

    /// Interpret raw classifier output.
    ///
    /// Surrounding whitespace is ignored; anything that is not exactly one
    /// label (extra words, unknown label, empty) becomes [`Emotion::FALLBACK`].
    pub fn from_model_output(raw: &str) -> Self {
        Self::from_label(raw.trim()).unwrap_or(Self::FALLBACK)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Emotion {
    type Err = crate::GenreTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| crate::GenreTableError::UnknownEmotion(s.to_string()))
    }
}

// =============================================================================
// Request Mode
// =============================================================================

/// Which branch of the conversation a message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    /// Emotion exploration, ending in a recommendation
    #[default]
    Emotion,
    /// Free movie chat after a recommendation
    Chat,
}

impl ChatMode {
    /// Only the literal `"chat"` selects free chat; anything else, including
    /// an absent mode, is treated as emotion exploration.
    pub fn from_request(mode: Option<&str>) -> Self {
        match mode {
            Some("chat") => ChatMode::Chat,
            _ => ChatMode::Emotion,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// State of a single conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    /// Exploration-mode messages received so far
    pub turn_count: u32,
    /// Raw user messages, in arrival order
    pub history: Vec<String>,
    /// Set when the terminal phase first runs; freezes `history`
    pub finalized: bool,
    /// Set once a recommendation has been produced
    pub recommended: bool,
    /// One-sentence emotion summary from the final turn
    pub summary: Option<String>,
    /// Titles handed out on the final turn
    pub recommended_movies: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an exploration-mode message and return the new turn number.
    ///
    /// The history is frozen once the terminal phase has run, whether or not
    /// it produced movies, so a repeated final turn replays the same transcript.
    pub fn record_turn(&mut self, text: &str) -> u32 {
        self.turn_count += 1;
        if !self.finalized {
            self.history.push(text.to_string());
        }
        self.turn_count
    }

    /// Whether the current turn should run the terminal pipeline
    pub fn is_ready_to_finalize(&self) -> bool {
        self.turn_count >= FINALIZE_AFTER_TURNS
    }

    /// Record that the terminal phase has started for this session
    pub fn mark_finalized(&mut self) {
        self.finalized = true;
    }

    /// History joined by newlines, as replayed into prompts
    pub fn transcript(&self) -> String {
        self.history.join("\n")
    }

    pub fn record_recommendation(&mut self, summary: String, titles: Vec<String>) {
        self.recommended = true;
        self.summary = Some(summary);
        self.recommended_movies = titles;
    }
}

// =============================================================================
// Reply Payloads
// =============================================================================

/// A single recommended title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedMovie {
    pub title: String,
}

/// Payload of the terminal turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReply {
    pub reply: String,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub summary: String,
    pub emotion: Emotion,
    pub sub_emotion: Option<String>,
    pub movies: Vec<RecommendedMovie>,
}

/// What a single inbound message produces.
///
/// Serialized untagged: `{reply}` for a plain turn, the full
/// [`FinalReply`] object for the terminal turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    Final(FinalReply),
    Message { reply: String },
}

impl ChatReply {
    pub fn message(reply: impl Into<String>) -> Self {
        ChatReply::Message {
            reply: reply.into(),
        }
    }

    pub fn reply(&self) -> &str {
        match self {
            ChatReply::Final(f) => &f.reply,
            ChatReply::Message { reply } => reply,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ChatReply::Final(_))
    }
}
