use crate::{SessionRepository, StoreError};
use arcoach_exercise::ExerciseSessionStats;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Session history kept in memory only.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Vec<ExerciseSessionStats>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for InMemorySessionStore {
    fn save(&mut self, stats: ExerciseSessionStats) -> Result<(), StoreError> {
        if !stats.is_finalized() {
            return Err(StoreError::NotFinalized);
        }
        self.sessions.push(stats);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ExerciseSessionStats>, StoreError> {
        Ok(self.sessions.clone())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionLog {
    #[serde(default)]
    sessions: Vec<ExerciseSessionStats>,
}

/// Session history in a TOML file, one `[[sessions]]` table per run.
pub struct TomlSessionStore {
    path: PathBuf,
}

impl TomlSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_log(&self) -> Result<SessionLog, StoreError> {
        if !self.path.exists() {
            return Ok(SessionLog::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&contents)?)
    }
}

impl SessionRepository for TomlSessionStore {
    fn save(&mut self, stats: ExerciseSessionStats) -> Result<(), StoreError> {
        if !stats.is_finalized() {
            return Err(StoreError::NotFinalized);
        }
        let mut log = self.read_log()?;
        log.sessions.push(stats);

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(&log)?;
        std::fs::write(&self.path, contents)?;
        info!(path = ?self.path, sessions = log.sessions.len(), "Saved session");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ExerciseSessionStats>, StoreError> {
        Ok(self.read_log()?.sessions)
    }
}
