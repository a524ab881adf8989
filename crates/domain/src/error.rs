//! Error types for the domain crate.
//!
//! The only fallible domain operation is loading the emotion → genre table,
//! so every variant here describes a way that table can be wrong.

use thiserror::Error;

use crate::types::Emotion;

/// Errors that can occur while loading or validating the genre table
#[derive(Error, Debug)]
pub enum GenreTableError {
    /// Table file could not be read
    #[error("Failed to read genre table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Table file is not a JSON object of label → list of ids
    #[error("Failed to parse genre table: {0}")]
    Parse(#[from] serde_json::Error),

    /// A key that is not one of the seven emotion labels
    #[error("Unknown emotion label: {0}")]
    UnknownEmotion(String),

    /// One of the seven labels has no entry
    #[error("Missing genre mapping for emotion {0}")]
    MissingEmotion(Emotion),

    /// A label maps to an empty list
    #[error("Empty genre list for emotion {0}")]
    EmptyGenres(Emotion),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, GenreTableError>;
