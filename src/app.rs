use crate::feedback::{Cue, FeedbackSink};
use arcoach_config::AppConfig;
use arcoach_exercise::{DepthLevelController, ExerciseEvent, ExercisePhase, LevelPlan};
use arcoach_feed::sim::SimulationParams;
use arcoach_feed::types::{ControlCommand, FeedEvent, FrameInput, GestureEvent};
use arcoach_history::{SessionRepository, StoreError};
use arcoach_placement::{PlacementEvent, PlacementStateMachine};
use arcoach_trail::DrawingTrailRecorder;
use tracing::{error, info};

/// Which part of the flow the frames are driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Placing,
    Exercising,
    Finished,
}

/// Application state: the three state machines plus their collaborators.
pub struct App {
    placement: PlacementStateMachine,
    exercise: DepthLevelController,
    trail: DrawingTrailRecorder,
    store: Box<dyn SessionRepository>,
    feedback: Box<dyn FeedbackSink>,
    mode: Mode,
    /// Timestamp of the latest frame.
    clock: f64,
    frame_count: u64,
}

impl App {
    pub fn new(
        config: &AppConfig,
        store: Box<dyn SessionRepository>,
        feedback: Box<dyn FeedbackSink>,
    ) -> Self {
        Self {
            placement: PlacementStateMachine::new(&config.placement),
            exercise: DepthLevelController::new(&config.exercise),
            trail: DrawingTrailRecorder::new(&config.drawing),
            store,
            feedback,
            mode: Mode::Placing,
            clock: 0.0,
            frame_count: 0,
        }
    }

    pub fn handle(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Frame(frame) => self.on_frame(&frame),
            FeedEvent::Gesture(gesture) => self.on_gesture(gesture),
            FeedEvent::Control(command) => self.on_control(command),
        }
        self.dispatch();
    }

    fn on_frame(&mut self, frame: &FrameInput) {
        self.clock = frame.timestamp;
        match self.mode {
            Mode::Placing => self.placement.on_frame(frame),
            Mode::Exercising => self
                .exercise
                .update(frame.observer_position, frame.timestamp),
            Mode::Finished => {}
        }
        self.trail.ingest(frame.observer_position);

        self.frame_count += 1;
        if self.frame_count % 600 == 0 {
            tracing::debug!(frames = self.frame_count, mode = ?self.mode, "Frame heartbeat");
        }
    }

    fn on_gesture(&mut self, gesture: GestureEvent) {
        // Holds draw in every mode.
        if let GestureEvent::HoldBegan | GestureEvent::HoldEnded = gesture {
            self.trail.set_active(gesture == GestureEvent::HoldBegan);
            return;
        }

        match self.mode {
            Mode::Placing => self.placement.on_gesture(gesture),
            Mode::Exercising => {
                if gesture == GestureEvent::TapConfirm
                    && self.exercise.phase() == ExercisePhase::AwaitingStart
                {
                    self.exercise.start(self.clock);
                }
            }
            Mode::Finished => {
                // Another run on the same placement.
                if gesture == GestureEvent::TapConfirm {
                    if let Some(transform) = self.placement.committed() {
                        self.exercise.arm(transform.position);
                        self.mode = Mode::Exercising;
                    }
                }
            }
        }
    }

    fn on_control(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::ResetPlacement => {
                self.exercise.reset();
                self.placement.reset();
                self.mode = Mode::Placing;
            }
            ControlCommand::ExitExercise => self.exercise.exit(self.clock),
            ControlCommand::ClearTrail => self.trail.clear(),
            ControlCommand::ReplayTrail => {
                let points = self.trail.replay();
                info!(points = points.len(), "Trail replayed");
            }
            ControlCommand::SelectColor(color) => self.trail.select_color(color),
        }
    }

    /// Forward queued events to feedback and react to the cross-machine ones.
    fn dispatch(&mut self) {
        let placement: Vec<PlacementEvent> = self.placement.drain_events().collect();
        for event in placement {
            if let PlacementEvent::Committed(transform) = event {
                self.exercise.arm(transform.position);
                self.mode = Mode::Exercising;
            }
            self.feedback.cue(&Cue::Placement(event));
        }

        let exercise: Vec<ExerciseEvent> = self.exercise.drain_events().collect();
        for event in exercise {
            if let ExerciseEvent::Finished(stats) = &event {
                if let Err(e) = self.store.save(stats.clone()) {
                    error!(?e, "Failed to save session");
                }
                self.mode = Mode::Finished;
            }
            self.feedback.cue(&Cue::Exercise(event));
        }

        let trail: Vec<_> = self.trail.drain_events().collect();
        for event in trail {
            self.feedback.cue(&Cue::Trail(event));
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn placement(&self) -> &PlacementStateMachine {
        &self.placement
    }

    pub fn exercise(&self) -> &DepthLevelController {
        &self.exercise
    }

    pub fn trail(&self) -> &DrawingTrailRecorder {
        &self.trail
    }

    pub fn sessions(&self) -> Result<Vec<arcoach_exercise::ExerciseSessionStats>, StoreError> {
        self.store.load_all()
    }

    pub fn log_summary(&self) {
        let best = match self.store.best_score() {
            Ok(best) => best,
            Err(e) => {
                error!(?e, "Failed to read session history");
                None
            }
        };
        info!(
            mode = ?self.mode,
            frames = self.frame_count,
            trail_points = self.trail.points().len(),
            best_score = best,
            "Session summary"
        );
    }
}

/// Scripted-session parameters consistent with `config`.
pub fn simulation_params(config: &AppConfig) -> SimulationParams {
    let plan = LevelPlan::from_config(&config.exercise);
    SimulationParams {
        object_height: config.placement.object_height,
        target_heights: plan.heights(),
        countdown_secs: config.exercise.countdown_ticks as f64 * config.exercise.tick_interval_secs,
        ..Default::default()
    }
}
