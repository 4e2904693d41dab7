use anyhow::{bail, Result};
use glam::Vec4;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Surface placement ritual.
    pub placement: PlacementConfig,
    /// Depth-progression exercise.
    pub exercise: ExerciseConfig,
    /// Free-hand trail drawing.
    pub drawing: DrawingConfig,
}

impl AppConfig {
    /// Reject values the state machines cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.placement.validate()?;
        self.exercise.validate()?;
        self.drawing.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Number of hit-test samples in the stability window.
    pub history_size: usize,
    /// Max distance (meters) any sample may sit from the window mean while stable.
    /// Observed values range from 0.005 (strict) to 0.01 (relaxed).
    pub stability_threshold: f32,
    /// Hits closer than this to the observer are rejected (meters).
    pub min_distance: f32,
    /// Hits farther than this from the observer are rejected (meters).
    pub max_distance: f32,
    /// Consecutive frames without a hit before the window is cleared.
    pub lost_tracking_frames: u32,
    /// Yaw snap granularity in degrees.
    pub snap_angle_degrees: f32,
    /// Yaw only snaps when it is strictly closer than this to a snap multiple.
    pub snap_tolerance_degrees: f32,
    /// Horizontal drag distance (screen points) per radian of yaw.
    pub drag_sensitivity: f32,
    /// Vertical extent of the placed object (meters). Half of it lifts the
    /// object so it rests on the surface.
    pub object_height: f32,
    /// Turn the object toward the observer when the position is confirmed.
    pub face_observer_on_confirm: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            history_size: 10,
            stability_threshold: 0.01,
            min_distance: 0.3,
            max_distance: 2.0,
            lost_tracking_frames: 30,
            snap_angle_degrees: 45.0,
            snap_tolerance_degrees: 10.0,
            drag_sensitivity: 200.0,
            object_height: 0.2,
            face_observer_on_confirm: true,
        }
    }
}

impl PlacementConfig {
    fn validate(&self) -> Result<()> {
        if self.history_size == 0 {
            bail!("placement.history_size must be at least 1");
        }
        if !(self.stability_threshold > 0.0) {
            bail!(
                "placement.stability_threshold must be positive: {}",
                self.stability_threshold
            );
        }
        if self.min_distance < 0.0 || self.min_distance >= self.max_distance {
            bail!(
                "placement distance range is empty: {}..{}",
                self.min_distance,
                self.max_distance
            );
        }
        if self.lost_tracking_frames == 0 {
            bail!("placement.lost_tracking_frames must be at least 1");
        }
        if !(self.snap_angle_degrees > 0.0) {
            bail!(
                "placement.snap_angle_degrees must be positive: {}",
                self.snap_angle_degrees
            );
        }
        if self.snap_tolerance_degrees < 0.0 {
            bail!(
                "placement.snap_tolerance_degrees must not be negative: {}",
                self.snap_tolerance_degrees
            );
        }
        if !(self.drag_sensitivity > 0.0) {
            bail!(
                "placement.drag_sensitivity must be positive: {}",
                self.drag_sensitivity
            );
        }
        if self.object_height < 0.0 {
            bail!("placement.object_height must not be negative");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseConfig {
    /// Target height above the anchor at level 1 (meters).
    pub start_height: f32,
    /// Lowest target height (meters).
    pub min_height: f32,
    /// Height drop per level (meters).
    pub step_distance: f32,
    /// Observer-to-target distance that counts as reaching it (meters).
    pub reach_threshold: f32,
    /// Countdown ticks between levels.
    pub countdown_ticks: u32,
    /// Seconds between countdown ticks.
    pub tick_interval_secs: f64,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            start_height: 1.0,
            min_height: 0.3,
            step_distance: 0.1,
            reach_threshold: 0.05,
            countdown_ticks: 3,
            tick_interval_secs: 1.0,
        }
    }
}

impl ExerciseConfig {
    fn validate(&self) -> Result<()> {
        if !(self.step_distance > 0.0) {
            bail!(
                "exercise.step_distance must be positive: {}",
                self.step_distance
            );
        }
        if self.start_height < self.min_height {
            bail!(
                "exercise.start_height ({}) is below min_height ({})",
                self.start_height,
                self.min_height
            );
        }
        if !(self.reach_threshold > 0.0) {
            bail!(
                "exercise.reach_threshold must be positive: {}",
                self.reach_threshold
            );
        }
        if self.countdown_ticks > 0 && !(self.tick_interval_secs > 0.0) {
            bail!(
                "exercise.tick_interval_secs must be positive: {}",
                self.tick_interval_secs
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// Minimum distance between consecutive trail points (meters).
    pub min_spacing: f32,
    /// Colour used until the user picks another.
    pub default_color: TrailColor,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            min_spacing: 0.05,
            default_color: TrailColor::White,
        }
    }
}

impl DrawingConfig {
    fn validate(&self) -> Result<()> {
        if !(self.min_spacing > 0.0) {
            bail!("drawing.min_spacing must be positive: {}", self.min_spacing);
        }
        Ok(())
    }
}

/// Colour tag attached to each trail point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailColor {
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl TrailColor {
    /// Linear RGBA for the render layer.
    pub fn rgba(self) -> Vec4 {
        match self {
            Self::White => Vec4::new(1.0, 1.0, 1.0, 1.0),
            Self::Red => Vec4::new(1.0, 0.23, 0.19, 1.0),
            Self::Orange => Vec4::new(1.0, 0.58, 0.0, 1.0),
            Self::Yellow => Vec4::new(1.0, 0.8, 0.0, 1.0),
            Self::Green => Vec4::new(0.2, 0.78, 0.35, 1.0),
            Self::Blue => Vec4::new(0.0, 0.48, 1.0, 1.0),
            Self::Purple => Vec4::new(0.69, 0.32, 0.87, 1.0),
        }
    }
}
