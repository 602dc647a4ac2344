//! Gesture detectors.
//!
//! Every detector sees one validated `HandFrame` at a time and reports at
//! most one `GestureKind` for it. Detectors that keep state across frames
//! (swipe history, pinch state) are owned per tracked hand by the engine
//! and dropped with it.

mod detector;
mod fingers;
mod motion;
mod pinch;
mod swipe;

pub use detector::GestureDetector;
pub use fingers::{classify_count, FingerCountDetector};
pub use motion::{MotionHistory, MotionSample};
pub use pinch::{PinchPhase, PinchScrubDetector};
pub use swipe::SwipeDetector;
