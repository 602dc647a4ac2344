//! Gesture Remote
//!
//! This crate turns a stream of hand-landmark observations into debounced
//! gesture events and the playback commands they drive.
//!
//! # Architecture
//!
//! Each tick flows through the engine in a fixed order:
//!
//! 1. **Validate**: malformed hand frames are discarded before any state is touched.
//! 2. **Swipe**: wrist history per hand, horizontal displacement over a full window.
//! 3. **Pinch-scrub**: thumb/index proximity state machine with a scrub offset.
//! 4. **Finger count**: stateless per-frame classification.
//! 5. **Gate**: per-category cooldown clocks for the one-shot gestures.
//! 6. **Map + dispatch**: admitted events become `PlaybackCommand`s for a sink.
//!
//! # Module Structure
//!
//! - `frame`: landmarks, hand frames, ticks and validation
//! - `detect`: motion history and the three detectors
//! - `cooldown`: the cooldown gate
//! - `mapper`: gesture → command mapping
//! - `engine`: per-hand state and the frame pipeline
//! - `controller`: engine + playback sink
//! - `ingest`: landmark sources (replay files, synthetic scripts)
//! - `transport`: playback sinks
//! - `config`: engine and daemon configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub mod config;
pub mod controller;
pub mod cooldown;
pub mod detect;
pub mod engine;
pub mod frame;
pub mod ingest;
pub mod mapper;
pub mod transport;

pub use config::{EngineConfig, GesturedConfig, ScrubOffsetMode};
pub use controller::GestureController;
pub use cooldown::CooldownGate;
pub use detect::{FingerCountDetector, MotionHistory, PinchScrubDetector, SwipeDetector};
pub use engine::{EngineStats, FrameOutcome, GestureEngine};
pub use frame::{FrameSize, HandFrame, Landmark, Point, RawHandFrame, Tick, LANDMARK_COUNT};
pub use ingest::{file::SourceConfig, LandmarkSource};
pub use mapper::map_gesture;
pub use transport::{LogSink, MemorySink, PlaybackSink};

// -------------------- Hands --------------------

/// Tracked-hand identity. One state record exists per handedness.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -------------------- Gesture Events --------------------

/// What a detector recognised on one frame.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GestureKind {
    SwipeLeft,
    SwipeRight,
    PinchScrubStart,
    /// Horizontal scrub offset in pixel-equivalent units.
    PinchScrubMove(f32),
    PinchScrubEnd,
    FistClosed,
    PeaceSign,
    ThreeFingers,
    /// Extended-finger count with no bound action (1, 4 or 5).
    Other(u8),
}

impl GestureKind {
    /// Cooldown category, or `None` for kinds that are never gated.
    pub fn category(&self) -> Option<GestureCategory> {
        match self {
            Self::SwipeLeft | Self::SwipeRight => Some(GestureCategory::Swipe),
            Self::FistClosed => Some(GestureCategory::FistClosed),
            Self::PeaceSign => Some(GestureCategory::PeaceSign),
            Self::ThreeFingers => Some(GestureCategory::ThreeFingers),
            Self::PinchScrubStart
            | Self::PinchScrubMove(_)
            | Self::PinchScrubEnd
            | Self::Other(_) => None,
        }
    }
}

/// A recognised gesture, stamped with the frame that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureEvent {
    pub hand: Handedness,
    pub timestamp: Duration,
    pub kind: GestureKind,
}

impl GestureEvent {
    pub fn new(hand: Handedness, timestamp: Duration, kind: GestureKind) -> Self {
        Self {
            hand,
            timestamp,
            kind,
        }
    }
}

/// Rate-limited gesture categories. Each has its own cooldown clock.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GestureCategory {
    Swipe,
    FistClosed,
    PeaceSign,
    ThreeFingers,
}

// -------------------- Playback Commands --------------------

/// Abstract command handed to the playback backend.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
#[serde(tag = "command", content = "offset", rename_all = "snake_case")]
pub enum PlaybackCommand {
    Previous,
    Next,
    TogglePlayPause,
    VolumeUp,
    VolumeDown,
    /// Scrub offset in pixel-equivalent units; see `ScrubOffsetMode`.
    Seek(f32),
}

impl fmt::Display for PlaybackCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Previous => f.write_str("previous"),
            Self::Next => f.write_str("next"),
            Self::TogglePlayPause => f.write_str("toggle_play_pause"),
            Self::VolumeUp => f.write_str("volume_up"),
            Self::VolumeDown => f.write_str("volume_down"),
            Self::Seek(offset) => write!(f, "seek({:+.1})", offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinch_and_other_kinds_are_never_gated() {
        assert_eq!(GestureKind::PinchScrubStart.category(), None);
        assert_eq!(GestureKind::PinchScrubMove(12.0).category(), None);
        assert_eq!(GestureKind::PinchScrubEnd.category(), None);
        assert_eq!(GestureKind::Other(4).category(), None);
    }

    #[test]
    fn both_swipe_directions_share_a_category() {
        assert_eq!(
            GestureKind::SwipeLeft.category(),
            GestureKind::SwipeRight.category()
        );
        assert_ne!(
            GestureKind::SwipeLeft.category(),
            GestureKind::PeaceSign.category()
        );
    }

    #[test]
    fn handedness_serializes_lowercase() {
        let json = serde_json::to_string(&Handedness::Right).unwrap();
        assert_eq!(json, "\"right\"");
        let parsed: Handedness = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(parsed, Handedness::Left);
    }

    #[test]
    fn seek_command_displays_signed_offset() {
        assert_eq!(PlaybackCommand::Seek(-12.5).to_string(), "seek(-12.5)");
        assert_eq!(PlaybackCommand::Next.to_string(), "next");
    }
}
