//! Deterministic scripted sessions for development without a device.
//!
//! The script walks through the whole product flow: search for a surface,
//! hold steady over it, confirm, drag-rotate, commit, start the exercise,
//! bend to every target level, then draw a short trail.

use crate::types::{ControlCommand, FeedEvent, FrameInput, GestureEvent, RayHit};
use glam::{Quat, Vec3};

/// Inputs for building a [`SimulatedSession`].
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Frame rate used for the scripted timestamps.
    pub frame_rate: f64,
    /// Where the observer stands and returns to between repetitions.
    pub observer_home: Vec3,
    /// Surface point the placement raycast hits.
    pub surface_point: Vec3,
    /// Vertical extent of the placed object; the exercise anchor sits at its centre.
    pub object_height: f32,
    /// Target height above the anchor for each level, in order.
    pub target_heights: Vec<f32>,
    /// Time spent bending toward each target.
    pub bend_secs: f64,
    /// Inter-level countdown length.
    pub countdown_secs: f64,
    /// Send an exit command after this many reached levels.
    pub exit_after_levels: Option<usize>,
    /// Drag distance (screen points) used during the rotation stage.
    pub drag_distance: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            observer_home: Vec3::new(0.0, 1.4, 0.0),
            surface_point: Vec3::new(0.0, 0.0, -1.0),
            object_height: 0.2,
            target_heights: vec![1.0, 0.9, 0.8, 0.7, 0.6],
            bend_secs: 2.5,
            countdown_secs: 3.0,
            exit_after_levels: None,
            drag_distance: 80.0,
        }
    }
}

/// A scripted, time-stamped list of feed events.
#[derive(Debug, Clone)]
pub struct SimulatedSession {
    events: Vec<FeedEvent>,
}

impl SimulatedSession {
    /// Full ritual: placement, exercise, then a short trail.
    pub fn new(params: &SimulationParams) -> Self {
        let mut script = Script::new(params.frame_rate);

        script.place(params, 20);

        // Start trigger.
        script.gesture(GestureEvent::TapConfirm);

        let anchor = params.surface_point + Vec3::Y * (params.object_height / 2.0);
        for (index, &height) in params.target_heights.iter().enumerate() {
            if params.exit_after_levels == Some(index) {
                script.control(ControlCommand::ExitExercise);
                break;
            }
            let target = anchor + Vec3::Y * height;
            script.move_to(target, params.bend_secs);
            let last = index + 1 == params.target_heights.len();
            if !last {
                // Straighten up while the countdown runs.
                script.move_to(params.observer_home, params.countdown_secs + 0.25);
            }
        }

        script.move_to(params.observer_home, 0.5);
        script.draw_line(Vec3::X * 0.3, 0.01);
        script.control(ControlCommand::ReplayTrail);

        Self {
            events: script.events,
        }
    }

    /// Only the placement ritual, holding steady for `hold_frames` frames.
    pub fn placement_only(hold_frames: usize) -> Self {
        let params = SimulationParams::default();
        let mut script = Script::new(params.frame_rate);
        script.place(&params, hold_frames);
        Self {
            events: script.events,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[FeedEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<FeedEvent> {
        self.events
    }
}

struct Script {
    events: Vec<FeedEvent>,
    clock: f64,
    dt: f64,
    observer: Vec3,
    forward: Vec3,
}

impl Script {
    fn new(frame_rate: f64) -> Self {
        Self {
            events: Vec::new(),
            clock: 0.0,
            dt: 1.0 / frame_rate.max(1.0),
            observer: Vec3::ZERO,
            forward: Vec3::NEG_Z,
        }
    }

    fn frame(&mut self, hit: Option<RayHit>) {
        self.events.push(FeedEvent::Frame(FrameInput {
            timestamp: self.clock,
            observer_position: self.observer,
            observer_forward: self.forward,
            hit,
        }));
        self.clock += self.dt;
    }

    fn gesture(&mut self, gesture: GestureEvent) {
        self.events.push(FeedEvent::Gesture(gesture));
    }

    fn control(&mut self, command: ControlCommand) {
        self.events.push(FeedEvent::Control(command));
    }

    fn look_at(&mut self, point: Vec3) {
        let dir = (point - self.observer).normalize_or_zero();
        if dir != Vec3::ZERO {
            self.forward = dir;
        }
    }

    /// Search, hold, confirm, rotate and commit.
    fn place(&mut self, params: &SimulationParams, hold_frames: usize) {
        self.observer = params.observer_home;
        self.look_at(params.surface_point);

        for _ in 0..5 {
            self.frame(None);
        }

        for i in 0..hold_frames {
            let hit = RayHit {
                position: params.surface_point + jitter(i),
                orientation: Quat::IDENTITY,
            };
            self.frame(Some(hit));
        }
        self.gesture(GestureEvent::TapConfirm);

        self.gesture(GestureEvent::DragBegan);
        let steps = 8;
        for step in 1..=steps {
            let delta = params.drag_distance * step as f32 / steps as f32;
            self.gesture(GestureEvent::DragChanged(delta));
            self.frame(None);
        }
        self.gesture(GestureEvent::DragEnded);
        self.frame(None);

        self.gesture(GestureEvent::TapConfirm);
        self.frame(None);
    }

    /// Glide the observer to `target` over `secs`, facing it, ending exactly on it.
    fn move_to(&mut self, target: Vec3, secs: f64) {
        let frames = ((secs / self.dt).round() as usize).max(1);
        let from = self.observer;
        self.look_at(target);
        for i in 1..=frames {
            let t = i as f32 / frames as f32;
            self.observer = from.lerp(target, t);
            self.frame(None);
        }
    }

    /// Hold, sweep along `offset` in `step`-meter frames, release.
    fn draw_line(&mut self, offset: Vec3, step: f32) {
        let from = self.observer;
        let length = offset.length();
        let frames = ((length / step).ceil() as usize).max(1);

        self.gesture(GestureEvent::HoldBegan);
        self.frame(None);
        for i in 1..=frames {
            let t = i as f32 / frames as f32;
            self.observer = from + offset * t;
            self.frame(None);
        }
        self.gesture(GestureEvent::HoldEnded);
        self.frame(None);
    }
}

/// Sub-millimetre hand tremor, deterministic per frame.
fn jitter(i: usize) -> Vec3 {
    let t = i as f32;
    Vec3::new((t * 1.7).sin(), 0.0, (t * 2.3).cos()) * 0.001
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(session: &SimulatedSession) -> Vec<FrameInput> {
        session
            .events()
            .iter()
            .filter_map(|e| match e {
                FeedEvent::Frame(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn timestamps_increase() {
        let session = SimulatedSession::new(&SimulationParams::default());
        let frames = frames(&session);
        assert!(frames.windows(2).all(|w| w[1].timestamp > w[0].timestamp));
    }

    #[test]
    fn bends_reach_every_target() {
        let params = SimulationParams::default();
        let session = SimulatedSession::new(&params);
        let frames = frames(&session);
        let anchor = params.surface_point + Vec3::Y * (params.object_height / 2.0);

        for &h in &params.target_heights {
            let target = anchor + Vec3::Y * h;
            assert!(frames
                .iter()
                .any(|f| f.observer_position.distance(target) < 1e-4));
        }
    }

    #[test]
    fn early_exit_cuts_the_exercise() {
        let params = SimulationParams {
            exit_after_levels: Some(2),
            ..Default::default()
        };
        let session = SimulatedSession::new(&params);
        let exits = session
            .events()
            .iter()
            .filter(|e| matches!(e, FeedEvent::Control(ControlCommand::ExitExercise)))
            .count();
        assert_eq!(exits, 1);
    }

    #[test]
    fn placement_only_has_two_confirms() {
        let session = SimulatedSession::placement_only(10);
        let taps = session
            .events()
            .iter()
            .filter(|e| matches!(e, FeedEvent::Gesture(GestureEvent::TapConfirm)))
            .count();
        assert_eq!(taps, 2);
    }
}
