//! Bounded history of wrist positions for one hand.

use std::collections::VecDeque;
use std::time::Duration;

use crate::frame::Point;

/// Default motion window, in frames.
pub const DEFAULT_WINDOW: usize = 10;

/// One wrist sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSample {
    pub position: Point,
    pub timestamp: Duration,
}

/// Bounded ring of recent wrist positions for one tracked hand.
///
/// - Holds at most `capacity` samples, evicting the oldest on overflow
/// - Samples stay in arrival (chronological) order
pub struct MotionHistory {
    samples: VecDeque<MotionSample>,
    capacity: usize,
}

impl MotionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample. Evicts the oldest if at capacity.
    pub fn push(&mut self, position: Point, timestamp: Duration) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(MotionSample {
            position,
            timestamp,
        });
    }

    /// Signed horizontal distance from the oldest to the newest sample.
    ///
    /// `None` until the window is full.
    pub fn displacement(&self) -> Option<f32> {
        if !self.is_full() {
            return None;
        }
        let oldest = self.samples.front()?;
        let newest = self.samples.back()?;
        Some(newest.position.x - oldest.position.x)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &MotionSample> + '_ {
        self.samples.iter()
    }
}

impl Default for MotionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
