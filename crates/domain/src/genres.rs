//! Emotion → TMDB genre table.
//!
//! The built-in table is the default policy. A JSON file of the form
//! `{"행복": [35, 10749], ...}` can replace it at startup; either way the
//! table is validated to cover all seven emotions with non-empty lists.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{GenreTableError, Result};
use crate::types::{Emotion, GenreId};

/// Validated mapping from each emotion to an ordered list of genre ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionGenreTable {
    genres: HashMap<Emotion, Vec<GenreId>>,
}

impl EmotionGenreTable {
    /// The default policy table.
    pub fn builtin() -> Self {
        let genres = HashMap::from([
            (Emotion::Happy, vec![35, 10749]),   // Comedy, Romance
            (Emotion::Sad, vec![18]),            // Drama
            (Emotion::Anxious, vec![53, 27]),    // Thriller, Horror
            (Emotion::Angry, vec![28, 80]),      // Action, Crime
            (Emotion::Bored, vec![12, 35]),      // Adventure, Comedy
            (Emotion::Curious, vec![878, 9648]), // Science Fiction, Mystery
            (Emotion::Stressed, vec![16, 10751]), // Animation, Family
        ]);
        Self { genres }
    }

    /// Build a table from label-keyed entries, validating totality.
    pub fn from_entries(entries: HashMap<String, Vec<GenreId>>) -> Result<Self> {
        let mut genres = HashMap::with_capacity(entries.len());
        for (label, ids) in entries {
            let emotion = label.parse::<Emotion>()?;
            if ids.is_empty() {
                return Err(GenreTableError::EmptyGenres(emotion));
            }
            genres.insert(emotion, ids);
        }

        if let Some(missing) = Emotion::ALL.into_iter().find(|e| !genres.contains_key(e)) {
            return Err(GenreTableError::MissingEmotion(missing));
        }

        Ok(Self { genres })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: HashMap<String, Vec<GenreId>> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Load and validate a table from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Reading genre table from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|source| GenreTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_json_str(&json)?;
        info!("Loaded genre table from {}", path.display());
        Ok(table)
    }

    /// Load from `path` when given, otherwise use the built-in table.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Genre ids for `emotion`.
    ///
    /// Construction guarantees every emotion is present, so this is never
    /// empty for a table obtained through this type's constructors.
    pub fn genres_for(&self, emotion: Emotion) -> &[GenreId] {
        self.genres.get(&emotion).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries in [`Emotion::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, &[GenreId])> + '_ {
        Emotion::ALL
            .into_iter()
            .map(move |emotion| (emotion, self.genres_for(emotion)))
    }
}

impl Default for EmotionGenreTable {
    fn default() -> Self {
        Self::builtin()
    }
}
