//! Surface placement: steady-hold detection over noisy hit-test samples,
//! then a confirm → rotate → commit ritual.

pub mod filter;
pub mod machine;
pub mod snap;

pub use filter::{PoseSampleFilter, SampleRejection};
pub use machine::{
    CandidatePose, PlacedTransform, PlacementEvent, PlacementStage, PlacementStateMachine,
    TrackingStatus,
};
pub use snap::snap_yaw;
