use crate::filter::{PoseSampleFilter, SampleRejection};
use crate::snap::{snap_yaw, yaw_facing};
use arcoach_config::PlacementConfig;
use arcoach_feed::types::{FrameInput, GestureEvent};
use glam::{EulerRot, Mat4, Quat, Vec3};
use tracing::{debug, info, trace};

/// Feedback category shown while the user searches for a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStatus {
    /// No usable samples yet, or tracking was lost for too long.
    Searching,
    /// Samples are accumulating but the window is not steady yet.
    Holding,
    /// The window is steady; the position can be confirmed.
    Stable,
    TooClose,
    TooFar,
    /// Hits stopped arriving, but not for long enough to discard the window.
    LostTracking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementStage {
    Positioning,
    Rotating,
    Committed,
}

/// Pose proposed by a stable window, before the user confirms it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePose {
    /// Window mean lifted by half the object height.
    pub position: Vec3,
    /// Orientation implied by the surface normal at the latest hit.
    pub orientation: Quat,
}

/// Position plus yaw about world +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTransform {
    pub position: Vec3,
    /// Radians.
    pub yaw: f32,
}

impl PlacedTransform {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Model matrix for the external scene.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::ONE, self.rotation(), self.position)
    }
}

/// Notifications for the render/haptics layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementEvent {
    StatusChanged(TrackingStatus),
    StageChanged(PlacementStage),
    /// Live yaw while dragging.
    YawChanged(f32),
    /// Yaw was pulled onto a snap multiple at drag release.
    Snapped { yaw: f32 },
    /// The object may be instantiated at this transform.
    Committed(PlacedTransform),
}

enum State {
    Positioning {
        candidate: Option<CandidatePose>,
    },
    Rotating {
        position: Vec3,
        yaw: f32,
        /// Yaw when the current drag began.
        drag_origin: Option<f32>,
    },
    Committed(PlacedTransform),
}

struct Settings {
    half_height: f32,
    lost_tracking_frames: u32,
    snap_angle: f32,
    snap_tolerance: f32,
    drag_sensitivity: f32,
    face_observer: bool,
}

/// Two-stage placement ritual: hold steady to pick a position, then drag to
/// set the yaw, then commit.
pub struct PlacementStateMachine {
    settings: Settings,
    filter: PoseSampleFilter,
    state: State,
    status: TrackingStatus,
    missed_frames: u32,
    observer_forward: Vec3,
    events: Vec<PlacementEvent>,
}

impl PlacementStateMachine {
    pub fn new(config: &PlacementConfig) -> Self {
        let filter = PoseSampleFilter::new(config.history_size, config.stability_threshold)
            .with_range(config.min_distance, config.max_distance);
        Self {
            settings: Settings {
                half_height: config.object_height / 2.0,
                lost_tracking_frames: config.lost_tracking_frames,
                snap_angle: config.snap_angle_degrees.to_radians(),
                snap_tolerance: config.snap_tolerance_degrees.to_radians(),
                drag_sensitivity: config.drag_sensitivity,
                face_observer: config.face_observer_on_confirm,
            },
            filter,
            state: State::Positioning { candidate: None },
            status: TrackingStatus::Searching,
            missed_frames: 0,
            observer_forward: Vec3::NEG_Z,
            events: Vec::new(),
        }
    }

    /// Feed one AR frame. Only the positioning stage looks at hits.
    pub fn on_frame(&mut self, frame: &FrameInput) {
        self.observer_forward = frame.observer_forward;

        let candidate = match &self.state {
            State::Positioning { candidate } => *candidate,
            _ => return,
        };

        let (candidate, status) = match frame.hit {
            None => {
                self.missed_frames = self.missed_frames.saturating_add(1);
                if self.missed_frames > self.settings.lost_tracking_frames {
                    if !self.filter.is_empty() {
                        debug!(missed = self.missed_frames, "Tracking lost, clearing window");
                    }
                    self.filter.reset();
                    (None, TrackingStatus::Searching)
                } else if self.filter.is_empty() {
                    (candidate, self.status)
                } else {
                    (candidate, TrackingStatus::LostTracking)
                }
            }
            Some(hit) => {
                self.missed_frames = 0;
                match self
                    .filter
                    .ingest_from(hit.position, frame.observer_position)
                {
                    Err(SampleRejection::TooClose { distance }) => {
                        trace!(distance, "Hit too close");
                        (None, TrackingStatus::TooClose)
                    }
                    Err(SampleRejection::TooFar { distance }) => {
                        trace!(distance, "Hit too far");
                        (None, TrackingStatus::TooFar)
                    }
                    Ok(()) if self.filter.is_stable() => {
                        let pose = CandidatePose {
                            position: self.filter.mean_position()
                                + Vec3::Y * self.settings.half_height,
                            orientation: hit.orientation,
                        };
                        (Some(pose), TrackingStatus::Stable)
                    }
                    Ok(()) => (None, TrackingStatus::Holding),
                }
            }
        };

        if let State::Positioning { candidate: slot } = &mut self.state {
            *slot = candidate;
        }
        self.set_status(status);
    }

    /// Route a gesture to the current stage.
    pub fn on_gesture(&mut self, gesture: GestureEvent) {
        match gesture {
            GestureEvent::TapConfirm => match self.stage() {
                PlacementStage::Positioning => {
                    self.confirm_position();
                }
                PlacementStage::Rotating => {
                    self.commit();
                }
                PlacementStage::Committed => {}
            },
            GestureEvent::DragBegan => self.begin_drag(),
            GestureEvent::DragChanged(delta_x) => self.drag_changed(delta_x),
            GestureEvent::DragEnded => self.end_drag(),
            GestureEvent::HoldBegan | GestureEvent::HoldEnded => {}
        }
    }

    /// Lock the stable position and move to the rotation stage.
    ///
    /// No-op unless positioning with a stable window.
    pub fn confirm_position(&mut self) -> bool {
        let pose = match &self.state {
            State::Positioning {
                candidate: Some(pose),
            } if self.filter.is_stable() => *pose,
            _ => {
                debug!(stage = ?self.stage(), "Confirm ignored");
                return false;
            }
        };

        let surface_yaw = pose.orientation.to_euler(EulerRot::YXZ).0;
        let yaw = if self.settings.face_observer {
            yaw_facing(self.observer_forward, surface_yaw)
        } else {
            surface_yaw
        };

        self.state = State::Rotating {
            position: pose.position,
            yaw,
            drag_origin: None,
        };
        info!(
            x = pose.position.x,
            y = pose.position.y,
            z = pose.position.z,
            yaw_degrees = yaw.to_degrees(),
            "Position confirmed"
        );
        self.events
            .push(PlacementEvent::StageChanged(PlacementStage::Rotating));
        true
    }

    pub fn begin_drag(&mut self) {
        if let State::Rotating {
            yaw, drag_origin, ..
        } = &mut self.state
        {
            *drag_origin = Some(*yaw);
        }
    }

    /// `delta_x` is the horizontal translation since the drag began.
    pub fn drag_changed(&mut self, delta_x: f32) {
        if let State::Rotating {
            yaw, drag_origin, ..
        } = &mut self.state
        {
            let origin = *drag_origin.get_or_insert(*yaw);
            *yaw = origin + delta_x / self.settings.drag_sensitivity;
            self.events.push(PlacementEvent::YawChanged(*yaw));
        }
    }

    /// Release the drag, snapping the yaw if it is close to a snap multiple.
    pub fn end_drag(&mut self) {
        if let State::Rotating {
            yaw, drag_origin, ..
        } = &mut self.state
        {
            if drag_origin.take().is_none() {
                return;
            }
            let snapped = snap_yaw(*yaw, self.settings.snap_angle, self.settings.snap_tolerance);
            if snapped != *yaw {
                debug!(
                    from_degrees = yaw.to_degrees(),
                    to_degrees = snapped.to_degrees(),
                    "Yaw snapped"
                );
                *yaw = snapped;
                self.events.push(PlacementEvent::Snapped { yaw: snapped });
            }
        }
    }

    /// Freeze the rotation-stage transform. `None` unless rotating.
    pub fn commit(&mut self) -> Option<PlacedTransform> {
        self.end_drag();

        let transform = match &self.state {
            State::Rotating { position, yaw, .. } => PlacedTransform {
                position: *position,
                yaw: *yaw,
            },
            _ => {
                debug!(stage = ?self.stage(), "Commit ignored");
                return None;
            }
        };

        self.state = State::Committed(transform);
        info!(yaw_degrees = transform.yaw.to_degrees(), "Placement committed");
        self.events
            .push(PlacementEvent::StageChanged(PlacementStage::Committed));
        self.events.push(PlacementEvent::Committed(transform));
        Some(transform)
    }

    /// Start over from an empty window.
    pub fn reset(&mut self) {
        self.state = State::Positioning { candidate: None };
        self.filter.reset();
        self.missed_frames = 0;
        info!("Placement reset");
        self.events
            .push(PlacementEvent::StageChanged(PlacementStage::Positioning));
        self.set_status(TrackingStatus::Searching);
    }

    pub fn stage(&self) -> PlacementStage {
        match self.state {
            State::Positioning { .. } => PlacementStage::Positioning,
            State::Rotating { .. } => PlacementStage::Rotating,
            State::Committed(_) => PlacementStage::Committed,
        }
    }

    pub fn status(&self) -> TrackingStatus {
        self.status
    }

    /// Preview pose while positioning with a stable window.
    pub fn candidate(&self) -> Option<CandidatePose> {
        match self.state {
            State::Positioning { candidate } => candidate,
            _ => None,
        }
    }

    /// Current transform once the position is locked.
    pub fn transform(&self) -> Option<PlacedTransform> {
        match self.state {
            State::Positioning { .. } => None,
            State::Rotating { position, yaw, .. } => Some(PlacedTransform { position, yaw }),
            State::Committed(transform) => Some(transform),
        }
    }

    pub fn committed(&self) -> Option<PlacedTransform> {
        match self.state {
            State::Committed(transform) => Some(transform),
            _ => None,
        }
    }

    pub fn filter(&self) -> &PoseSampleFilter {
        &self.filter
    }

    /// Take the notifications queued since the last drain.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, PlacementEvent> {
        self.events.drain(..)
    }

    fn set_status(&mut self, status: TrackingStatus) {
        if self.status != status {
            debug!(from = ?self.status, to = ?status, "Tracking status changed");
            self.status = status;
            self.events.push(PlacementEvent::StatusChanged(status));
        }
    }
}
