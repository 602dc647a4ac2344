//! Gesture classification engine.
//!
//! The engine owns one `HandState` per tracked hand, keyed by handedness.
//! A hand's state is created on its first valid frame and dropped when the
//! hand is reported absent, so nothing carries across a tracking gap.
//!
//! Per frame, in order:
//! 1. validate (a malformed frame touches no state)
//! 2. swipe, pinch-scrub, finger count
//! 3. cooldown gate for rate-limited categories
//! 4. map admitted gestures to commands
//!
//! Dispatching the commands is the controller's job.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::cooldown::CooldownGate;
use crate::detect::{FingerCountDetector, GestureDetector, PinchScrubDetector, SwipeDetector};
use crate::frame::{HandFrame, RawHandFrame, Tick};
use crate::mapper::map_gesture;
use crate::{GestureEvent, GestureKind, Handedness, PlaybackCommand};

/// Counters for health logging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub frames_processed: u64,
    pub frames_rejected: u64,
    pub events_emitted: u64,
    pub commands_dispatched: u64,
    pub dispatch_failures: u64,
    pub hands_lost: u64,
}

/// Everything one frame (or one absence) produced, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    /// Every gesture the detectors reported, gated or not.
    pub events: Vec<GestureEvent>,
    /// Commands for the gestures the cooldown gate admitted.
    pub commands: Vec<PlaybackCommand>,
    /// True when a pinch-scrub ended on this frame.
    pub scrub_ended: bool,
}

impl FrameOutcome {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.commands.is_empty()
    }

    fn extend(&mut self, other: FrameOutcome) {
        self.events.extend(other.events);
        self.commands.extend(other.commands);
        self.scrub_ended |= other.scrub_ended;
    }
}

/// Mutable state for one tracked hand.
struct HandState {
    swipe: SwipeDetector,
    pinch: PinchScrubDetector,
    fingers: FingerCountDetector,
    cooldown: CooldownGate,
    last_timestamp: Duration,
}

impl HandState {
    fn new(config: &EngineConfig, first_timestamp: Duration) -> Self {
        Self {
            swipe: SwipeDetector::new(config.swipe_window, config.swipe_threshold_px),
            pinch: PinchScrubDetector::new(config.pinch_threshold_px, config.scrub_offset_mode),
            fingers: FingerCountDetector::new(),
            cooldown: CooldownGate::new(config.cooldown),
            last_timestamp: first_timestamp,
        }
    }
}

pub struct GestureEngine {
    config: EngineConfig,
    hands: BTreeMap<Handedness, HandState>,
    stats: EngineStats,
}

impl GestureEngine {
    /// Build an engine. Fails if `config` does not validate.
    pub fn new(config: EngineConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EngineConfig) -> Self {
        Self {
            config,
            hands: BTreeMap::new(),
            stats: EngineStats::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut EngineStats {
        &mut self.stats
    }

    /// Process one tick: absences first, then each frame in arrival order.
    pub fn process_tick(&mut self, tick: &Tick) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        for hand in &tick.absent {
            outcome.extend(self.hand_lost(*hand, tick.timestamp));
        }
        for frame in &tick.frames {
            outcome.extend(self.process_frame(frame));
        }
        outcome
    }

    /// Classify one hand frame.
    ///
    /// A malformed frame, or one whose timestamp does not advance past the
    /// hand's previous frame, is discarded without touching any state.
    pub fn process_frame(&mut self, raw: &RawHandFrame) -> FrameOutcome {
        let frame = match self.validate(raw) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.frames_rejected += 1;
                log::warn!("frame rejected ({} hand): {}", raw.handedness, e);
                return FrameOutcome::default();
            }
        };
        self.stats.frames_processed += 1;

        let hand = frame.handedness();
        let now = frame.timestamp();
        let size = self.config.frame_size;
        let config = &self.config;
        let state = self.hands.entry(hand).or_insert_with(|| {
            log::info!("tracking {} hand", hand);
            HandState::new(config, now)
        });
        state.last_timestamp = now;

        let mut outcome = FrameOutcome::default();
        let detectors: [&mut dyn GestureDetector; 3] =
            [&mut state.swipe, &mut state.pinch, &mut state.fingers];
        for detector in detectors {
            let Some(kind) = detector.observe(&frame, size) else {
                continue;
            };
            log::debug!("{} hand: {} -> {:?}", hand, detector.name(), kind);
            outcome.events.push(GestureEvent::new(hand, now, kind));
            if kind == GestureKind::PinchScrubEnd {
                outcome.scrub_ended = true;
            }

            let admitted = match kind.category() {
                Some(category) => state.cooldown.allow(category, now),
                None => true,
            };
            if !admitted {
                log::debug!("{} hand: {:?} suppressed by cooldown", hand, kind);
                continue;
            }
            if let Some(command) = map_gesture(&kind) {
                outcome.commands.push(command);
            }
        }

        self.stats.events_emitted += outcome.events.len() as u64;
        outcome
    }

    /// Reset a hand that the source reported absent.
    ///
    /// Drops its motion history, pinch state and cooldown clocks. An active
    /// pinch-scrub is closed with a final `PinchScrubEnd` at `at`.
    pub fn hand_lost(&mut self, hand: Handedness, at: Duration) -> FrameOutcome {
        let Some(mut state) = self.hands.remove(&hand) else {
            return FrameOutcome::default();
        };
        self.stats.hands_lost += 1;
        log::info!("{} hand lost; state reset", hand);

        let mut outcome = FrameOutcome::default();
        if state.pinch.release() {
            outcome
                .events
                .push(GestureEvent::new(hand, at, GestureKind::PinchScrubEnd));
            outcome.scrub_ended = true;
            self.stats.events_emitted += 1;
        }
        outcome
    }

    pub fn is_tracking(&self, hand: Handedness) -> bool {
        self.hands.contains_key(&hand)
    }

    pub fn tracked_hands(&self) -> impl Iterator<Item = Handedness> + '_ {
        self.hands.keys().copied()
    }

    /// Samples currently in a hand's motion history.
    pub fn history_len(&self, hand: Handedness) -> Option<usize> {
        self.hands.get(&hand).map(|state| state.swipe.history().len())
    }

    pub fn is_pinched(&self, hand: Handedness) -> bool {
        self.hands
            .get(&hand)
            .map(|state| state.pinch.is_pinched())
            .unwrap_or(false)
    }

    /// True while any tracked hand holds a pinch.
    pub fn any_pinched(&self) -> bool {
        self.hands.values().any(|state| state.pinch.is_pinched())
    }

    /// Last admitted firing for a category on a hand.
    pub fn last_fired(
        &self,
        hand: Handedness,
        category: crate::GestureCategory,
    ) -> Option<Duration> {
        self.hands
            .get(&hand)
            .and_then(|state| state.cooldown.last_fired(category))
    }

    fn validate(&self, raw: &RawHandFrame) -> anyhow::Result<HandFrame> {
        let frame = HandFrame::from_raw(raw)?;
        if let Some(state) = self.hands.get(&frame.handedness()) {
            if frame.timestamp() <= state.last_timestamp {
                return Err(anyhow::anyhow!(
                    "non-monotonic timestamp {:?} (last {:?})",
                    frame.timestamp(),
                    state.last_timestamp
                ));
            }
        }
        Ok(frame)
    }
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::from_valid_config(EngineConfig::default())
    }
}
