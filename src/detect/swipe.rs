//! Horizontal swipe detection over the wrist motion history.

use crate::frame::{landmarks, FrameSize, HandFrame};
use crate::GestureKind;

use super::detector::GestureDetector;
use super::motion::MotionHistory;

/// Horizontal wrist swipe over a full motion window.
///
/// Once a swipe fires the history is cleared, so one continuous motion
/// counts once.
pub struct SwipeDetector {
    history: MotionHistory,
    threshold_px: f32,
}

impl SwipeDetector {
    pub fn new(window: usize, threshold_px: f32) -> Self {
        Self {
            history: MotionHistory::new(window),
            threshold_px,
        }
    }

    pub fn history(&self) -> &MotionHistory {
        &self.history
    }
}

impl GestureDetector for SwipeDetector {
    fn name(&self) -> &'static str {
        "swipe"
    }

    fn observe(&mut self, frame: &HandFrame, size: FrameSize) -> Option<GestureKind> {
        let wrist = frame.point(landmarks::WRIST, size);
        self.history.push(wrist, frame.timestamp());

        let displacement = self.history.displacement()?;
        if displacement.abs() <= self.threshold_px {
            return None;
        }

        self.history.clear();
        if displacement < 0.0 {
            Some(GestureKind::SwipeLeft)
        } else {
            Some(GestureKind::SwipeRight)
        }
    }
}
