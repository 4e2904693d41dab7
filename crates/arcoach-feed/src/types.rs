use arcoach_config::TrailColor;
use glam::{Quat, Vec3};

/// Surface hit from the per-frame placement raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit point (meters).
    pub position: Vec3,
    /// Orientation implied by the surface normal at the hit.
    pub orientation: Quat,
}

/// One AR session frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Seconds on the session clock.
    pub timestamp: f64,
    /// Camera position in world space.
    pub observer_position: Vec3,
    /// Camera forward direction (unit length).
    pub observer_forward: Vec3,
    /// Placement raycast result, `None` when nothing was hit this frame.
    pub hit: Option<RayHit>,
}

/// Discrete gesture notifications from the touch layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    DragBegan,
    /// Horizontal translation since the drag began (screen points).
    DragChanged(f32),
    DragEnded,
    TapConfirm,
    HoldBegan,
    HoldEnded,
}

/// Button-style commands from the surrounding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Throw away the placement (and any running exercise) and start over.
    ResetPlacement,
    /// Stop the running exercise early.
    ExitExercise,
    /// Remove all trail points.
    ClearTrail,
    /// Ask for the stored trail so visuals can be rebuilt.
    ReplayTrail,
    /// Colour for subsequently recorded trail points.
    SelectColor(TrailColor),
}

/// Everything the core consumes, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedEvent {
    Frame(FrameInput),
    Gesture(GestureEvent),
    Control(ControlCommand),
}
