use crate::level::LevelPlan;
use crate::stats::ExerciseSessionStats;
use arcoach_config::ExerciseConfig;
use glam::Vec3;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExercisePhase {
    Idle,
    AwaitingStart,
    Active,
    Complete,
}

/// Notifications for the render/haptics layer and the session store.
#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseEvent {
    /// Waiting for the start trigger.
    Armed,
    Started { level: u32, height: f32 },
    /// The observer reached the current target.
    LevelReached { level: u32, duration_secs: f64 },
    /// Moved to a lower target; a countdown may follow.
    LevelAdvanced { level: u32, height: f32 },
    CountdownTick { remaining: u32 },
    /// Repetition timing for `level` has begun.
    LevelArmed { level: u32 },
    /// Final record, emitted once per run.
    Finished(ExerciseSessionStats),
    /// Armed run abandoned before it started.
    Cancelled,
}

enum RepTimer {
    Running { started_at: f64 },
    Countdown { remaining: u32, next_tick_at: f64 },
}

enum State {
    Idle,
    AwaitingStart {
        anchor: Vec3,
    },
    Active {
        anchor: Vec3,
        level: u32,
        height: f32,
        timer: RepTimer,
        stats: ExerciseSessionStats,
    },
    Complete {
        stats: ExerciseSessionStats,
    },
}

/// Guided bending exercise: the target drops one step per reached level.
///
/// Driven once per frame with the observer position and the frame time;
/// countdowns are deadlines checked on those calls, never sleeps.
pub struct DepthLevelController {
    plan: LevelPlan,
    max_levels: u32,
    reach_threshold: f32,
    countdown_ticks: u32,
    tick_interval: f64,
    state: State,
    events: Vec<ExerciseEvent>,
}

impl DepthLevelController {
    pub fn new(config: &ExerciseConfig) -> Self {
        let plan = LevelPlan::from_config(config);
        Self {
            max_levels: plan.max_levels(),
            plan,
            reach_threshold: config.reach_threshold,
            countdown_ticks: config.countdown_ticks,
            tick_interval: config.tick_interval_secs,
            state: State::Idle,
            events: Vec::new(),
        }
    }

    /// Prepare a run whose targets hang above `anchor`.
    ///
    /// Allowed from `Idle` or `Complete`; ignored mid-run.
    pub fn arm(&mut self, anchor: Vec3) {
        match self.state {
            State::Idle | State::Complete { .. } => {
                self.state = State::AwaitingStart { anchor };
                info!(max_levels = self.max_levels, "Exercise armed");
                self.events.push(ExerciseEvent::Armed);
            }
            _ => debug!(phase = ?self.phase(), "Arm ignored"),
        }
    }

    /// Begin level 1. Returns `false` unless armed.
    pub fn start(&mut self, now: f64) -> bool {
        let anchor = match self.state {
            State::AwaitingStart { anchor } => anchor,
            _ => {
                debug!(phase = ?self.phase(), "Start ignored");
                return false;
            }
        };

        let height = self.plan.height(1);
        self.state = State::Active {
            anchor,
            level: 1,
            height,
            timer: RepTimer::Running { started_at: now },
            stats: ExerciseSessionStats::new(now, self.max_levels),
        };
        info!(height, "Exercise started");
        self.events.push(ExerciseEvent::Started { level: 1, height });
        true
    }

    /// Per-frame check: run the countdown, or test whether the observer
    /// reached the current target.
    pub fn update(&mut self, observer: Vec3, now: f64) {
        let State::Active {
            anchor,
            level,
            height,
            timer,
            stats,
        } = &mut self.state
        else {
            return;
        };

        if let RepTimer::Countdown {
            remaining,
            next_tick_at,
        } = timer
        {
            while *remaining > 0 && now >= *next_tick_at {
                *remaining -= 1;
                *next_tick_at += self.tick_interval;
                self.events.push(ExerciseEvent::CountdownTick {
                    remaining: *remaining,
                });
            }
            if *remaining > 0 {
                return;
            }
            *timer = RepTimer::Running { started_at: now };
            debug!(level = *level, "Level armed");
            self.events.push(ExerciseEvent::LevelArmed { level: *level });
            return;
        }
        let RepTimer::Running { started_at } = *timer else {
            return;
        };

        let target = *anchor + Vec3::Y * *height;
        if observer.distance(target) >= self.reach_threshold {
            return;
        }

        let duration_secs = (now - started_at).max(0.0);
        stats.record_repetition(*level, duration_secs);
        info!(level = *level, duration_secs, "Level reached");
        self.events.push(ExerciseEvent::LevelReached {
            level: *level,
            duration_secs,
        });

        if *level >= self.max_levels {
            let reached = *level;
            let depth = self.plan.start_height - *height;
            self.complete(now, reached, depth);
            return;
        }

        *level += 1;
        *height = self.plan.height(*level);
        *timer = if self.countdown_ticks == 0 {
            RepTimer::Running { started_at: now }
        } else {
            RepTimer::Countdown {
                remaining: self.countdown_ticks,
                next_tick_at: now + self.tick_interval,
            }
        };
        self.events.push(ExerciseEvent::LevelAdvanced {
            level: *level,
            height: *height,
        });
    }

    /// Stop early. The level in progress is not credited.
    pub fn exit(&mut self, now: f64) {
        match self.state {
            State::Active { level, .. } => {
                let reached = level - 1;
                let depth = if reached == 0 {
                    0.0
                } else {
                    self.plan.start_height - self.plan.height(reached)
                };
                info!(reached, "Exercise exited early");
                self.complete(now, reached, depth);
            }
            State::AwaitingStart { .. } => {
                self.state = State::Idle;
                info!("Armed exercise cancelled");
                self.events.push(ExerciseEvent::Cancelled);
            }
            State::Idle | State::Complete { .. } => {}
        }
    }

    /// Abandon everything, including any pending countdown.
    pub fn reset(&mut self) {
        if !matches!(self.state, State::Idle) {
            debug!(phase = ?self.phase(), "Exercise reset");
        }
        self.state = State::Idle;
    }

    pub fn phase(&self) -> ExercisePhase {
        match self.state {
            State::Idle => ExercisePhase::Idle,
            State::AwaitingStart { .. } => ExercisePhase::AwaitingStart,
            State::Active { .. } => ExercisePhase::Active,
            State::Complete { .. } => ExercisePhase::Complete,
        }
    }

    pub fn level(&self) -> Option<u32> {
        match self.state {
            State::Active { level, .. } => Some(level),
            _ => None,
        }
    }

    pub fn height(&self) -> Option<f32> {
        match self.state {
            State::Active { height, .. } => Some(height),
            _ => None,
        }
    }

    /// World position of the current target.
    pub fn target_position(&self) -> Option<Vec3> {
        match self.state {
            State::Active { anchor, height, .. } => Some(anchor + Vec3::Y * height),
            _ => None,
        }
    }

    /// True while the inter-level countdown blocks advancement.
    pub fn is_counting_down(&self) -> bool {
        matches!(
            self.state,
            State::Active {
                timer: RepTimer::Countdown { .. },
                ..
            }
        )
    }

    /// Live stats while active, final stats once complete.
    pub fn stats(&self) -> Option<&ExerciseSessionStats> {
        match &self.state {
            State::Active { stats, .. } | State::Complete { stats } => Some(stats),
            _ => None,
        }
    }

    pub fn max_levels(&self) -> u32 {
        self.max_levels
    }

    pub fn plan(&self) -> &LevelPlan {
        &self.plan
    }

    /// Take the notifications queued since the last drain.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, ExerciseEvent> {
        self.events.drain(..)
    }

    fn complete(&mut self, now: f64, reached: u32, depth: f32) {
        let mut stats = match std::mem::replace(&mut self.state, State::Idle) {
            State::Active { stats, .. } => stats,
            other => {
                self.state = other;
                return;
            }
        };

        if stats.finalize(now, reached, depth) {
            info!(
                reached_levels = stats.reached_levels,
                max_levels = stats.max_levels,
                score = stats.performance_score,
                "Exercise complete"
            );
            self.events.push(ExerciseEvent::Finished(stats.clone()));
        }
        self.state = State::Complete { stats };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(countdown_ticks: u32) -> ExerciseConfig {
        ExerciseConfig {
            start_height: 1.0,
            min_height: 0.6,
            step_distance: 0.1,
            reach_threshold: 0.05,
            countdown_ticks,
            tick_interval_secs: 1.0,
        }
    }

    fn started(countdown_ticks: u32) -> DepthLevelController {
        let mut controller = DepthLevelController::new(&config(countdown_ticks));
        controller.arm(Vec3::ZERO);
        assert!(controller.start(0.0));
        controller
    }

    /// Reach the current target at `now`.
    fn reach(controller: &mut DepthLevelController, now: f64) {
        let target = controller.target_position().unwrap();
        controller.update(target, now);
    }

    #[test]
    fn start_requires_arming() {
        let mut controller = DepthLevelController::new(&config(0));
        assert!(!controller.start(0.0));
        assert_eq!(controller.phase(), ExercisePhase::Idle);
        controller.arm(Vec3::ZERO);
        assert_eq!(controller.phase(), ExercisePhase::AwaitingStart);
        assert!(controller.start(0.0));
        assert_eq!(controller.level(), Some(1));
        assert_eq!(controller.height(), Some(1.0));
    }

    #[test]
    fn far_observer_does_not_advance() {
        let mut controller = started(0);
        controller.update(Vec3::new(0.0, 1.0, 0.2), 1.0);
        assert_eq!(controller.level(), Some(1));
    }

    #[test]
    fn five_levels_then_complete() {
        let mut controller = started(0);
        assert_eq!(controller.max_levels(), 5);

        for expected in 1..=5u32 {
            assert_eq!(controller.level(), Some(expected));
            reach(&mut controller, expected as f64 * 2.0);
        }

        assert_eq!(controller.phase(), ExercisePhase::Complete);
        let stats = controller.stats().unwrap();
        assert_eq!(stats.reached_levels, 5);
        assert_eq!(stats.repetitions.len(), 5);
        assert!((stats.max_depth_reached - 0.4).abs() < 1e-5);
        assert_eq!(stats.end_time, Some(10.0));
        assert_eq!(stats.performance_score, Some(100));
    }

    #[test]
    fn level_rises_by_one_and_never_past_max() {
        let mut controller = started(0);
        let mut last = 1;
        for i in 0..20 {
            match controller.target_position() {
                Some(target) => controller.update(target, i as f64),
                None => break,
            }
            if let Some(level) = controller.level() {
                assert_eq!(level, last + 1);
                assert!(level <= controller.max_levels());
                last = level;
            }
        }
        assert_eq!(last, 5);
        assert_eq!(controller.phase(), ExercisePhase::Complete);
    }

    #[test]
    fn countdown_blocks_advancement() {
        let mut controller = started(3);
        reach(&mut controller, 2.5);
        assert_eq!(controller.level(), Some(2));
        assert!(controller.is_counting_down());

        // Already on the next target, but the countdown is running.
        reach(&mut controller, 2.6);
        reach(&mut controller, 3.5);
        reach(&mut controller, 4.5);
        assert_eq!(controller.level(), Some(2));

        // Third tick re-arms; the reach counts from the following frame.
        reach(&mut controller, 5.5);
        assert!(!controller.is_counting_down());
        assert_eq!(controller.level(), Some(2));

        reach(&mut controller, 8.0);
        assert_eq!(controller.level(), Some(3));
        let reps = controller.stats().unwrap().repetition_secs();
        assert_eq!(reps, vec![2.5, 2.5]);

        let ticks: Vec<u32> = controller
            .drain_events()
            .filter_map(|e| match e {
                ExerciseEvent::CountdownTick { remaining } => Some(remaining),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![2, 1, 0]);
    }

    #[test]
    fn late_frame_runs_all_due_ticks() {
        let mut controller = started(3);
        reach(&mut controller, 1.0);
        controller.update(Vec3::splat(10.0), 30.0);
        assert!(!controller.is_counting_down());
    }

    #[test]
    fn exit_does_not_credit_current_level() {
        let mut controller = started(0);
        reach(&mut controller, 2.0);
        reach(&mut controller, 4.0);
        assert_eq!(controller.level(), Some(3));

        controller.exit(5.0);
        assert_eq!(controller.phase(), ExercisePhase::Complete);
        let stats = controller.stats().unwrap();
        assert_eq!(stats.reached_levels, 2);
        assert_eq!(stats.end_time, Some(5.0));
        assert!((stats.max_depth_reached - 0.1).abs() < 1e-5);
    }

    #[test]
    fn exit_twice_finishes_once() {
        let mut controller = started(0);
        reach(&mut controller, 2.0);
        controller.exit(3.0);
        let first = controller.stats().cloned();
        controller.exit(9.0);
        assert_eq!(controller.stats().cloned(), first);

        let finished = controller
            .drain_events()
            .filter(|e| matches!(e, ExerciseEvent::Finished(_)))
            .count();
        assert_eq!(finished, 1);
    }

    #[test]
    fn exit_before_start_cancels() {
        let mut controller = DepthLevelController::new(&config(0));
        controller.arm(Vec3::ZERO);
        controller.exit(1.0);
        assert_eq!(controller.phase(), ExercisePhase::Idle);
        assert!(controller.stats().is_none());
    }

    #[test]
    fn reset_drops_pending_countdown() {
        let mut controller = started(3);
        reach(&mut controller, 1.0);
        assert!(controller.is_counting_down());
        controller.reset();
        assert_eq!(controller.phase(), ExercisePhase::Idle);
        controller.update(Vec3::ZERO, 10.0);
        assert!(controller.drain_events().all(|e| !matches!(e, ExerciseEvent::LevelArmed { .. })));
    }

    #[test]
    fn targets_hang_above_anchor() {
        let mut controller = DepthLevelController::new(&config(0));
        controller.arm(Vec3::new(1.0, 0.1, -2.0));
        controller.start(0.0);
        let target = controller.target_position().unwrap();
        assert!(target.distance(Vec3::new(1.0, 1.1, -2.0)) < 1e-6);
    }
}
