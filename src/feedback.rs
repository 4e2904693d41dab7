use arcoach_exercise::ExerciseEvent;
use arcoach_placement::{PlacementEvent, PlacementStage, TrackingStatus};
use arcoach_trail::TrailEvent;
use tracing::{debug, info};

/// A state-machine notification on its way to the render/haptics layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Placement(PlacementEvent),
    Exercise(ExerciseEvent),
    Trail(TrailEvent),
}

/// Haptic pattern categories the platform layer knows how to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPattern {
    None,
    Tick,
    Light,
    Medium,
    Warning,
    Success,
}

impl Cue {
    pub fn haptic(&self) -> HapticPattern {
        match self {
            Cue::Placement(event) => match event {
                PlacementEvent::StatusChanged(TrackingStatus::Stable) => HapticPattern::Light,
                PlacementEvent::StatusChanged(
                    TrackingStatus::TooClose | TrackingStatus::TooFar,
                ) => HapticPattern::Warning,
                PlacementEvent::StatusChanged(_) => HapticPattern::None,
                PlacementEvent::StageChanged(PlacementStage::Positioning) => HapticPattern::None,
                PlacementEvent::StageChanged(_) => HapticPattern::Medium,
                PlacementEvent::YawChanged(_) => HapticPattern::None,
                PlacementEvent::Snapped { .. } => HapticPattern::Tick,
                PlacementEvent::Committed(_) => HapticPattern::Success,
            },
            Cue::Exercise(event) => match event {
                ExerciseEvent::LevelReached { .. } => HapticPattern::Medium,
                ExerciseEvent::CountdownTick { .. } => HapticPattern::Tick,
                ExerciseEvent::Finished(_) => HapticPattern::Success,
                ExerciseEvent::Cancelled => HapticPattern::Warning,
                _ => HapticPattern::None,
            },
            Cue::Trail(TrailEvent::PointAdded(_)) => HapticPattern::Tick,
            Cue::Trail(_) => HapticPattern::None,
        }
    }

    /// Linear RGBA to draw a new trail segment with.
    pub fn trail_rgba(&self) -> Option<[f32; 4]> {
        match self {
            Cue::Trail(TrailEvent::PointAdded(point)) => Some(point.color.rgba().to_array()),
            _ => None,
        }
    }
}

/// Receiver for state-machine cues. Fire-and-forget.
pub trait FeedbackSink: Send {
    fn cue(&mut self, cue: &Cue);
}

/// Logs cues instead of driving visuals and haptics.
#[derive(Default)]
pub struct LogFeedback {
    delivered: u64,
}

impl FeedbackSink for LogFeedback {
    fn cue(&mut self, cue: &Cue) {
        self.delivered += 1;
        let haptic = cue.haptic();
        match cue {
            Cue::Trail(TrailEvent::PointAdded(point)) => {
                debug!(
                    position = ?point.position,
                    rgba = ?cue.trail_rgba(),
                    ?haptic,
                    "Cue: trail point"
                );
            }
            Cue::Placement(PlacementEvent::YawChanged(_))
            | Cue::Exercise(ExerciseEvent::CountdownTick { .. }) => {
                debug!(?cue, ?haptic, "Cue");
            }
            Cue::Exercise(ExerciseEvent::Finished(stats)) => {
                info!(
                    reached_levels = stats.reached_levels,
                    score = stats.performance_score,
                    ?haptic,
                    "Cue: exercise finished"
                );
            }
            _ => info!(?cue, ?haptic, "Cue"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcoach_config::TrailColor;

    #[test]
    fn commit_plays_success() {
        let cue = Cue::Placement(PlacementEvent::Committed(
            arcoach_placement::PlacedTransform {
                position: glam::Vec3::ZERO,
                yaw: 0.0,
            },
        ));
        assert_eq!(cue.haptic(), HapticPattern::Success);
    }

    #[test]
    fn out_of_range_warns() {
        let cue = Cue::Placement(PlacementEvent::StatusChanged(TrackingStatus::TooFar));
        assert_eq!(cue.haptic(), HapticPattern::Warning);
    }

    #[test]
    fn trail_point_carries_its_color() {
        let cue = Cue::Trail(TrailEvent::PointAdded(arcoach_trail::DrawingPoint {
            position: glam::Vec3::X,
            color: TrailColor::Green,
        }));
        assert_eq!(cue.trail_rgba(), Some(TrailColor::Green.rgba().to_array()));
        assert_eq!(cue.haptic(), HapticPattern::Tick);

        let other = Cue::Trail(TrailEvent::Cleared);
        assert_eq!(other.trail_rgba(), None);
    }

    #[test]
    fn countdown_ticks() {
        let cue = Cue::Exercise(ExerciseEvent::CountdownTick { remaining: 2 });
        assert_eq!(cue.haptic(), HapticPattern::Tick);
    }
}
