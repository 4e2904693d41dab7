use arcoach_config::{DrawingConfig, TrailColor};
use glam::Vec3;
use tracing::{debug, info, trace};

/// One recorded trail sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingPoint {
    pub position: Vec3,
    pub color: TrailColor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrailEvent {
    Activated,
    Deactivated,
    PointAdded(DrawingPoint),
    Cleared,
    Replayed { count: usize },
}

/// Records a polyline of observer positions while drawing is held.
///
/// Points are spaced at least `min_spacing` apart, measured from the last
/// recorded point rather than the last observed position.
pub struct DrawingTrailRecorder {
    min_spacing: f32,
    color: TrailColor,
    active: bool,
    points: Vec<DrawingPoint>,
    last_recorded: Option<Vec3>,
    events: Vec<TrailEvent>,
}

impl DrawingTrailRecorder {
    pub fn new(config: &DrawingConfig) -> Self {
        Self {
            min_spacing: config.min_spacing,
            color: config.default_color,
            active: false,
            points: Vec::new(),
            last_recorded: None,
            events: Vec::new(),
        }
    }

    /// Turning drawing on does not record a point by itself.
    pub fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        debug!(active, points = self.points.len(), "Trail drawing toggled");
        self.events.push(if active {
            TrailEvent::Activated
        } else {
            TrailEvent::Deactivated
        });
    }

    pub fn ingest(&mut self, position: Vec3) {
        if !self.active {
            return;
        }
        if let Some(last) = self.last_recorded {
            if position.distance(last) < self.min_spacing {
                return;
            }
        }

        let point = DrawingPoint {
            position,
            color: self.color,
        };
        self.points.push(point);
        self.last_recorded = Some(position);
        trace!(count = self.points.len(), "Trail point recorded");
        self.events.push(TrailEvent::PointAdded(point));
    }

    /// Colour for points recorded from now on.
    pub fn select_color(&mut self, color: TrailColor) {
        self.color = color;
    }

    pub fn clear(&mut self) {
        info!(points = self.points.len(), "Trail cleared");
        self.points.clear();
        self.last_recorded = None;
        self.events.push(TrailEvent::Cleared);
    }

    /// Copy of the stored points, so visuals can be rebuilt.
    pub fn replay(&mut self) -> Vec<DrawingPoint> {
        self.events.push(TrailEvent::Replayed {
            count: self.points.len(),
        });
        self.points.clone()
    }

    pub fn points(&self) -> &[DrawingPoint] {
        &self.points
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn color(&self) -> TrailColor {
        self.color
    }

    /// Take the notifications queued since the last drain.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, TrailEvent> {
        self.events.drain(..)
    }
}
