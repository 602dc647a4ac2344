//! Thumb/index pinch with horizontal scrub offsets.

use crate::config::ScrubOffsetMode;
use crate::frame::{landmarks, FrameSize, HandFrame};
use crate::GestureKind;

use super::detector::GestureDetector;

/// Pinch state for one hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PinchPhase {
    Idle,
    /// Held; `reference_x` is the pinch point the next offset is measured from.
    Pinched { reference_x: f32 },
}

/// Thumb-tip / index-tip pinch with horizontal scrub.
///
/// `Idle -> Pinched` emits `PinchScrubStart`, every held frame emits
/// `PinchScrubMove`, `Pinched -> Idle` emits `PinchScrubEnd`. The threshold
/// is a single exact crossing in both directions: a distance strictly below
/// it is pinched, anything else is not.
pub struct PinchScrubDetector {
    phase: PinchPhase,
    threshold_px: f32,
    offset_mode: ScrubOffsetMode,
}

impl PinchScrubDetector {
    pub fn new(threshold_px: f32, offset_mode: ScrubOffsetMode) -> Self {
        Self {
            phase: PinchPhase::Idle,
            threshold_px,
            offset_mode,
        }
    }

    pub fn phase(&self) -> PinchPhase {
        self.phase
    }

    pub fn is_pinched(&self) -> bool {
        matches!(self.phase, PinchPhase::Pinched { .. })
    }

    /// Drop any active pinch. Returns true if one was active.
    pub fn release(&mut self) -> bool {
        let was_pinched = self.is_pinched();
        self.phase = PinchPhase::Idle;
        was_pinched
    }
}

impl GestureDetector for PinchScrubDetector {
    fn name(&self) -> &'static str {
        "pinch_scrub"
    }

    fn observe(&mut self, frame: &HandFrame, size: FrameSize) -> Option<GestureKind> {
        let thumb = frame.point(landmarks::THUMB_TIP, size);
        let index = frame.point(landmarks::INDEX_FINGER_TIP, size);
        let pinched = thumb.distance(&index) < self.threshold_px;
        let pinch_x = (thumb.x + index.x) / 2.0;

        match (self.phase, pinched) {
            (PinchPhase::Idle, true) => {
                self.phase = PinchPhase::Pinched {
                    reference_x: pinch_x,
                };
                Some(GestureKind::PinchScrubStart)
            }
            (PinchPhase::Pinched { reference_x }, true) => {
                let offset = pinch_x - reference_x;
                if self.offset_mode == ScrubOffsetMode::FrameDelta {
                    self.phase = PinchPhase::Pinched {
                        reference_x: pinch_x,
                    };
                }
                Some(GestureKind::PinchScrubMove(offset))
            }
            (PinchPhase::Pinched { .. }, false) => {
                self.phase = PinchPhase::Idle;
                Some(GestureKind::PinchScrubEnd)
            }
            (PinchPhase::Idle, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Landmark, RawHandFrame, LANDMARK_COUNT};
    use crate::Handedness;
    use std::time::Duration;

    const SIZE: FrameSize = FrameSize {
        width: 1024,
        height: 1024,
    };

    /// Frame whose thumb and index tips sit `distance` px apart vertically,
    /// centred horizontally on `x` px.
    fn pinch_frame(i: u64, distance: f32, x: f32) -> HandFrame {
        let w = SIZE.width as f32;
        let h = SIZE.height as f32;
        let landmarks = (0..LANDMARK_COUNT as u8)
            .map(|id| match id as usize {
                landmarks::THUMB_TIP => Landmark::new(id, x / w, 400.0 / h),
                landmarks::INDEX_FINGER_TIP => Landmark::new(id, x / w, (400.0 + distance) / h),
                _ => Landmark::new(id, 0.5, 0.5),
            })
            .collect();
        let raw = RawHandFrame::new(Handedness::Left, Duration::from_millis(i * 33), landmarks);
        HandFrame::from_raw(&raw).unwrap()
    }

    fn run(detector: &mut PinchScrubDetector, frames: &[(f32, f32)]) -> Vec<GestureKind> {
        frames
            .iter()
            .enumerate()
            .filter_map(|(i, (d, x))| detector.observe(&pinch_frame(i as u64, *d, *x), SIZE))
            .collect()
    }

    #[test]
    fn pinch_sequence_emits_start_move_end() {
        let mut detector = PinchScrubDetector::new(40.0, ScrubOffsetMode::Cumulative);
        let events = run(
            &mut detector,
            &[
                (50.0, 200.0),
                (50.0, 200.0),
                (30.0, 200.0),
                (30.0, 232.0),
                (50.0, 232.0),
            ],
        );
        assert_eq!(
            events,
            vec![
                GestureKind::PinchScrubStart,
                GestureKind::PinchScrubMove(32.0),
                GestureKind::PinchScrubEnd,
            ]
        );
        assert_eq!(detector.phase(), PinchPhase::Idle);
    }

    #[test]
    fn exact_threshold_is_not_pinched() {
        let mut detector = PinchScrubDetector::new(40.0, ScrubOffsetMode::Cumulative);
        assert!(run(&mut detector, &[(40.0, 100.0)]).is_empty());

        let events = run(&mut detector, &[(39.0, 100.0), (40.0, 100.0)]);
        assert_eq!(
            events,
            vec![GestureKind::PinchScrubStart, GestureKind::PinchScrubEnd]
        );
    }

    #[test]
    fn cumulative_offset_is_measured_from_pinch_start() {
        let mut detector = PinchScrubDetector::new(40.0, ScrubOffsetMode::Cumulative);
        let events = run(
            &mut detector,
            &[(10.0, 100.0), (10.0, 110.0), (10.0, 130.0), (10.0, 90.0)],
        );
        assert_eq!(
            events,
            vec![
                GestureKind::PinchScrubStart,
                GestureKind::PinchScrubMove(10.0),
                GestureKind::PinchScrubMove(30.0),
                GestureKind::PinchScrubMove(-10.0),
            ]
        );
    }

    #[test]
    fn frame_delta_offset_is_per_frame() {
        let mut detector = PinchScrubDetector::new(40.0, ScrubOffsetMode::FrameDelta);
        let events = run(
            &mut detector,
            &[(10.0, 100.0), (10.0, 110.0), (10.0, 130.0), (10.0, 90.0)],
        );
        assert_eq!(
            events,
            vec![
                GestureKind::PinchScrubStart,
                GestureKind::PinchScrubMove(10.0),
                GestureKind::PinchScrubMove(20.0),
                GestureKind::PinchScrubMove(-40.0),
            ]
        );
    }

    #[test]
    fn release_reports_active_pinch() {
        let mut detector = PinchScrubDetector::new(40.0, ScrubOffsetMode::Cumulative);
        assert!(!detector.release());
        run(&mut detector, &[(10.0, 100.0)]);
        assert!(detector.release());
        assert!(!detector.is_pinched());
    }
}
