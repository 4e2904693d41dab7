use arcoach_config::ExerciseConfig;

/// Slack for float division when counting levels, so a span that is an exact
/// multiple of the step is not lost to rounding (0.4 / 0.1 = 3.9999998).
const LEVEL_COUNT_EPSILON: f32 = 1e-4;

/// Target heights for each level of a depth-progression run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelPlan {
    pub start_height: f32,
    pub min_height: f32,
    pub step_distance: f32,
}

impl LevelPlan {
    pub fn from_config(config: &ExerciseConfig) -> Self {
        Self {
            start_height: config.start_height,
            min_height: config.min_height,
            step_distance: config.step_distance,
        }
    }

    /// floor((start - min) / step) + 1, never less than one level.
    pub fn max_levels(&self) -> u32 {
        if self.step_distance <= 0.0 {
            return 1;
        }
        let span = (self.start_height - self.min_height).max(0.0);
        (span / self.step_distance + LEVEL_COUNT_EPSILON).floor() as u32 + 1
    }

    /// Target height for a 1-based level, clamped at `min_height`.
    pub fn height(&self, level: u32) -> f32 {
        let steps = level.max(1) - 1;
        (self.start_height - steps as f32 * self.step_distance).max(self.min_height)
    }

    /// Heights for every level, in order.
    pub fn heights(&self) -> Vec<f32> {
        (1..=self.max_levels()).map(|l| self.height(l)).collect()
    }
}
