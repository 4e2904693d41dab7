pub mod store;

use arcoach_exercise::ExerciseSessionStats;
use thiserror::Error;

pub use store::{InMemorySessionStore, TomlSessionStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session has not been finalized")]
    NotFinalized,
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session file is malformed: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("Session could not be encoded: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Where finished exercise runs are kept.
///
/// Passed explicitly to whatever needs session history.
pub trait SessionRepository: Send {
    /// Store a finalized run.
    fn save(&mut self, stats: ExerciseSessionStats) -> Result<(), StoreError>;

    /// Every stored run, oldest first.
    fn load_all(&self) -> Result<Vec<ExerciseSessionStats>, StoreError>;

    /// Highest score across stored runs.
    fn best_score(&self) -> Result<Option<u8>, StoreError> {
        Ok(self
            .load_all()?
            .iter()
            .filter_map(|s| s.performance_score)
            .max())
    }
}
