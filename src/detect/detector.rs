//! The detector trait the engine drives once per validated frame.

use crate::frame::{FrameSize, HandFrame};
use crate::GestureKind;

/// Per-frame gesture detector.
///
/// # Contract
///
/// Implementations MUST:
/// - Report at most one gesture per frame
/// - Keep no state that outlives the tracked hand they belong to
/// - Never block; a frame is processed to completion before the next one
pub trait GestureDetector: Send {
    /// Detector identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Observe one validated frame.
    fn observe(&mut self, frame: &HandFrame, size: FrameSize) -> Option<GestureKind>;
}
