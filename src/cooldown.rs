//! Per-category cooldown gate.
//!
//! Each `GestureCategory` keeps its own clock; admitting one category never
//! delays another. A zero interval admits everything.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::GestureCategory;

/// Default minimum interval between two firings of the same category.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);

#[derive(Clone, Debug)]
pub struct CooldownGate {
    interval: Duration,
    last_fired: BTreeMap<GestureCategory, Duration>,
}

impl CooldownGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: BTreeMap::new(),
        }
    }

    /// Admit `category` at `now` if its interval has elapsed.
    ///
    /// Only an admitted call records `now`; a refused call changes nothing.
    pub fn allow(&mut self, category: GestureCategory, now: Duration) -> bool {
        if let Some(last) = self.last_fired.get(&category) {
            // saturating: a clock that went backwards never reopens the gate early
            if now.saturating_sub(*last) < self.interval {
                return false;
            }
        }
        self.last_fired.insert(category, now);
        true
    }

    pub fn last_fired(&self, category: GestureCategory) -> Option<Duration> {
        self.last_fired.get(&category).copied()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn reset(&mut self) {
        self.last_fired.clear();
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
