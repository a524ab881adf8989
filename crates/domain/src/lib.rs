//! # Domain Crate
//!
//! Shared vocabulary for the mood-based movie recommender.
//!
//! ## Main Components
//!
//! - **types**: Emotion taxonomy, request mode, session state, reply payloads
//! - **genres**: Validated emotion → TMDB genre table
//! - **error**: Error types for loading the genre table
//!
//! ## Example Usage
//!
//! ```ignore
//! use domain::{Emotion, EmotionGenreTable};
//!
//! let table = EmotionGenreTable::builtin();
//! let emotion = Emotion::from_model_output(" 슬픔 ");
//! assert_eq!(table.genres_for(emotion), &[18]);
//! ```

// Public modules
pub mod error;
pub mod genres;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{GenreTableError, Result};
pub use genres::EmotionGenreTable;
pub use types::{
    // Type aliases and constants
    GenreId,
    SessionId,
    FINALIZE_AFTER_TURNS,
    MAX_RECOMMENDATIONS,
    // Core types
    ChatMode,
    ChatReply,
    Emotion,
    FinalReply,
    RecommendedMovie,
    Session,
};
