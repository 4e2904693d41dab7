use crate::scoring::performance_score;
use serde::{Deserialize, Serialize};

/// Time taken to reach one level's target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepetitionRecord {
    pub level: u32,
    pub duration_secs: f64,
}

/// Summary of one exercise run, handed to persistence once finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSessionStats {
    /// Session clock seconds when the run started.
    pub start_time: f64,
    /// Set exactly once, when the run completes or is exited.
    pub end_time: Option<f64>,
    pub max_levels: u32,
    pub reached_levels: u32,
    /// Start height minus the height of the deepest credited level (meters).
    pub max_depth_reached: f32,
    pub performance_score: Option<u8>,
    /// Kept last so the TOML form lists scalars before the repetition tables.
    pub repetitions: Vec<RepetitionRecord>,
}

impl ExerciseSessionStats {
    pub fn new(start_time: f64, max_levels: u32) -> Self {
        Self {
            start_time,
            end_time: None,
            max_levels,
            reached_levels: 0,
            max_depth_reached: 0.0,
            performance_score: None,
            repetitions: Vec::new(),
        }
    }

    /// Append a repetition. Ignored once finalized.
    pub fn record_repetition(&mut self, level: u32, duration_secs: f64) {
        if self.is_finalized() {
            return;
        }
        self.repetitions.push(RepetitionRecord {
            level,
            duration_secs,
        });
    }

    /// Stamp the end time, credited levels, depth and score.
    ///
    /// Returns `false` and changes nothing if already finalized.
    pub fn finalize(&mut self, end_time: f64, reached_levels: u32, max_depth_reached: f32) -> bool {
        if self.is_finalized() {
            return false;
        }
        self.end_time = Some(end_time);
        self.reached_levels = reached_levels;
        self.max_depth_reached = max_depth_reached.max(0.0);
        self.performance_score = Some(performance_score(
            reached_levels,
            self.max_levels,
            &self.repetition_secs(),
        ));
        true
    }

    pub fn is_finalized(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn repetition_secs(&self) -> Vec<f64> {
        self.repetitions.iter().map(|r| r.duration_secs).collect()
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.end_time.map(|end| (end - self.start_time).max(0.0))
    }

    pub fn average_repetition_secs(&self) -> Option<f64> {
        if self.repetitions.is_empty() {
            return None;
        }
        let total: f64 = self.repetitions.iter().map(|r| r.duration_secs).sum();
        Some(total / self.repetitions.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExerciseSessionStats {
        let mut stats = ExerciseSessionStats::new(10.0, 5);
        stats.record_repetition(1, 2.0);
        stats.record_repetition(2, 2.0);
        stats
    }

    #[test]
    fn finalize_sets_everything() {
        let mut stats = sample();
        assert!(stats.finalize(20.0, 2, 0.1));
        assert_eq!(stats.end_time, Some(20.0));
        assert_eq!(stats.reached_levels, 2);
        assert_eq!(stats.duration_secs(), Some(10.0));
        // 20 level + 20 pacing + 30 consistency.
        assert_eq!(stats.performance_score, Some(70));
    }

    #[test]
    fn second_finalize_is_ignored() {
        let mut once = sample();
        once.finalize(20.0, 2, 0.1);

        let mut twice = sample();
        twice.finalize(20.0, 2, 0.1);
        assert!(!twice.finalize(35.0, 5, 0.4));

        assert_eq!(once, twice);
    }

    #[test]
    fn repetitions_frozen_after_finalize() {
        let mut stats = sample();
        stats.finalize(20.0, 2, 0.1);
        stats.record_repetition(3, 9.0);
        assert_eq!(stats.repetitions.len(), 2);
    }

    #[test]
    fn average_repetition() {
        let mut stats = ExerciseSessionStats::new(0.0, 3);
        assert_eq!(stats.average_repetition_secs(), None);
        stats.record_repetition(1, 2.0);
        stats.record_repetition(2, 4.0);
        assert_eq!(stats.average_repetition_secs(), Some(3.0));
    }
}
