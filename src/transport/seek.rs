use std::time::{Duration, Instant};

use crate::config::ScrubOffsetMode;

/// Seeks never land closer than this to the end of the track.
const END_GUARD_MS: u64 = 1000;

/// Where the track was when a scrub started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackPosition {
    pub progress_ms: u64,
    pub duration_ms: u64,
}

#[derive(Clone, Copy, Debug)]
struct Anchor {
    position: TrackPosition,
    accumulated_px: f64,
}

/// Turns scrub offsets into absolute seek targets.
///
/// The first `Seek` of a scrub anchors on the current track position; every
/// later offset is resolved against that anchor until `finish()`. Small
/// shifts and rapid-fire seeks are dropped so the remote API sees at most one
/// seek per `interval`.
#[derive(Clone, Debug)]
pub struct SeekPlanner {
    mode: ScrubOffsetMode,
    ms_per_px: f64,
    min_shift_ms: u64,
    interval: Duration,
    anchor: Option<Anchor>,
    last_seek_at: Option<Instant>,
}

impl SeekPlanner {
    pub fn new(
        mode: ScrubOffsetMode,
        ms_per_px: f64,
        min_shift_ms: u64,
        interval: Duration,
    ) -> Self {
        Self {
            mode,
            ms_per_px,
            min_shift_ms,
            interval,
            anchor: None,
            last_seek_at: None,
        }
    }

    pub fn needs_anchor(&self) -> bool {
        self.anchor.is_none()
    }

    pub fn anchor(&mut self, position: TrackPosition) {
        self.anchor = Some(Anchor {
            position,
            accumulated_px: 0.0,
        });
    }

    /// Resolve one scrub offset. `None` means no seek should be issued.
    pub fn plan(&mut self, offset_px: f32, now: Instant) -> Option<u64> {
        let anchor = self.anchor.as_mut()?;
        match self.mode {
            ScrubOffsetMode::Cumulative => anchor.accumulated_px = offset_px as f64,
            ScrubOffsetMode::FrameDelta => anchor.accumulated_px += offset_px as f64,
        }

        let shift_ms = anchor.accumulated_px * self.ms_per_px;
        if shift_ms.abs() <= self.min_shift_ms as f64 {
            return None;
        }
        if let Some(last) = self.last_seek_at {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }

        let max_ms = anchor.position.duration_ms.saturating_sub(END_GUARD_MS);
        let target = (anchor.position.progress_ms as f64 + shift_ms).clamp(0.0, max_ms as f64);
        self.last_seek_at = Some(now);
        Some(target.round() as u64)
    }

    /// The scrub is over; the next `Seek` anchors afresh.
    pub fn finish(&mut self) {
        self.anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(mode: ScrubOffsetMode) -> SeekPlanner {
        SeekPlanner::new(mode, 250.0, 500, Duration::from_millis(200))
    }

    fn position() -> TrackPosition {
        TrackPosition {
            progress_ms: 60_000,
            duration_ms: 180_000,
        }
    }

    #[test]
    fn no_seek_without_anchor() {
        let mut p = planner(ScrubOffsetMode::Cumulative);
        assert!(p.needs_anchor());
        assert_eq!(p.plan(100.0, Instant::now()), None);
    }

    #[test]
    fn cumulative_offsets_resolve_against_anchor() {
        let mut p = planner(ScrubOffsetMode::Cumulative);
        p.anchor(position());
        let t0 = Instant::now();
        assert_eq!(p.plan(40.0, t0), Some(70_000));
        // Absolute, not added to the previous offset.
        assert_eq!(p.plan(-40.0, t0 + Duration::from_millis(300)), Some(50_000));
    }

    #[test]
    fn frame_delta_offsets_accumulate() {
        let mut p = planner(ScrubOffsetMode::FrameDelta);
        p.anchor(position());
        let t0 = Instant::now();
        assert_eq!(p.plan(20.0, t0), Some(65_000));
        assert_eq!(p.plan(20.0, t0 + Duration::from_millis(300)), Some(70_000));
    }

    #[test]
    fn small_shifts_are_dropped() {
        let mut p = planner(ScrubOffsetMode::Cumulative);
        p.anchor(position());
        // 2 px * 250 ms = 500 ms, not above the minimum.
        assert_eq!(p.plan(2.0, Instant::now()), None);
    }

    #[test]
    fn seeks_are_rate_limited() {
        let mut p = planner(ScrubOffsetMode::Cumulative);
        p.anchor(position());
        let t0 = Instant::now();
        assert!(p.plan(10.0, t0).is_some());
        assert_eq!(p.plan(12.0, t0 + Duration::from_millis(100)), None);
        assert!(p.plan(12.0, t0 + Duration::from_millis(200)).is_some());
    }

    #[test]
    fn targets_are_clamped_to_the_track() {
        let mut p = planner(ScrubOffsetMode::Cumulative);
        p.anchor(position());
        let t0 = Instant::now();
        assert_eq!(p.plan(-1000.0, t0), Some(0));
        assert_eq!(p.plan(1000.0, t0 + Duration::from_secs(1)), Some(179_000));
    }

    #[test]
    fn finish_drops_the_anchor() {
        let mut p = planner(ScrubOffsetMode::Cumulative);
        p.anchor(position());
        p.finish();
        assert!(p.needs_anchor());
    }
}
