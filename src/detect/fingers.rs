//! Extended-finger count.

use crate::frame::{landmarks, FrameSize, HandFrame};
use crate::GestureKind;

use super::detector::GestureDetector;

/// A fingertip must clear its PIP joint by this much (px) to count as extended.
pub const FINGER_EXTENSION_MARGIN_PX: f32 = 10.0;

/// Horizontal thumb-tip to thumb-IP spread (px) for an extended thumb.
pub const THUMB_EXTENSION_MARGIN_PX: f32 = 30.0;

/// (tip, PIP) pairs for the four non-thumb fingers.
const FINGERS: [(usize, usize); 4] = [
    (landmarks::INDEX_FINGER_TIP, landmarks::INDEX_FINGER_PIP),
    (landmarks::MIDDLE_FINGER_TIP, landmarks::MIDDLE_FINGER_PIP),
    (landmarks::RING_FINGER_TIP, landmarks::RING_FINGER_PIP),
    (landmarks::PINKY_TIP, landmarks::PINKY_PIP),
];

/// Stateless extended-finger counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct FingerCountDetector;

impl FingerCountDetector {
    pub fn new() -> Self {
        Self
    }

    /// Number of extended fingers, 0..=5.
    ///
    /// Only relative tip/joint positions are compared, so the count does not
    /// change when the whole hand is translated.
    pub fn count(frame: &HandFrame, size: FrameSize) -> u8 {
        let thumb_tip = frame.point(landmarks::THUMB_TIP, size);
        let thumb_ip = frame.point(landmarks::THUMB_IP, size);
        let thumb = (thumb_tip.x - thumb_ip.x).abs() > THUMB_EXTENSION_MARGIN_PX;

        let fingers = FINGERS
            .iter()
            .filter(|(tip, pip)| {
                let tip = frame.point(*tip, size);
                let pip = frame.point(*pip, size);
                // y grows downward: extended tips sit above (lower y) their PIP.
                tip.y < pip.y - FINGER_EXTENSION_MARGIN_PX
            })
            .count();

        fingers as u8 + u8::from(thumb)
    }
}

/// Map an extended-finger count onto a gesture.
pub fn classify_count(count: u8) -> GestureKind {
    match count {
        0 => GestureKind::FistClosed,
        2 => GestureKind::PeaceSign,
        3 => GestureKind::ThreeFingers,
        other => GestureKind::Other(other),
    }
}

impl GestureDetector for FingerCountDetector {
    fn name(&self) -> &'static str {
        "finger_count"
    }

    fn observe(&mut self, frame: &HandFrame, size: FrameSize) -> Option<GestureKind> {
        Some(classify_count(Self::count(frame, size)))
    }
}
