pub mod controller;
pub mod level;
pub mod scoring;
pub mod stats;

pub use controller::{DepthLevelController, ExerciseEvent, ExercisePhase};
pub use level::LevelPlan;
pub use scoring::{performance_score, score_breakdown, ScoreBreakdown};
pub use stats::{ExerciseSessionStats, RepetitionRecord};
