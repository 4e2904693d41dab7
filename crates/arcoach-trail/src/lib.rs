pub mod recorder;

pub use recorder::{DrawingPoint, DrawingTrailRecorder, TrailEvent};
