//! Hand frame model.
//!
//! - `Landmark`: one anatomical keypoint, normalized image coordinates.
//! - `RawHandFrame`: what the landmark source hands over. Untrusted.
//! - `HandFrame`: a validated frame with exactly one landmark per identifier.
//! - `Tick`: everything observed at one time step, including explicit absences.
//!
//! Validation happens once, in `HandFrame::from_raw`. Detectors only ever see
//! validated frames, so they index landmarks without bounds checks failing.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Handedness;

/// Landmarks per hand in the hand-landmark model.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark identifiers (hand-landmark model convention).
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

// ----------------------------------------------------------------------------
// Landmark
// ----------------------------------------------------------------------------

/// A single tracked keypoint.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    /// Anatomical identifier, 0..=20.
    pub id: u8,
    /// X coordinate (0.0 to 1.0, normalized to image width)
    pub x: f32,
    /// Y coordinate (0.0 to 1.0, normalized to image height, increasing downward)
    pub y: f32,
    /// Optional depth relative to the wrist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl Landmark {
    pub fn new(id: u8, x: f32, y: f32) -> Self {
        Self { id, x, y, z: None }
    }
}

/// Image size used to scale normalized coordinates into pixel-equivalent units.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// A position in pixel-equivalent units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ----------------------------------------------------------------------------
// RawHandFrame: untrusted input
// ----------------------------------------------------------------------------

/// A hand observation exactly as the landmark source produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct RawHandFrame {
    pub handedness: Handedness,
    pub timestamp: Duration,
    pub landmarks: Vec<Landmark>,
}

impl RawHandFrame {
    pub fn new(handedness: Handedness, timestamp: Duration, landmarks: Vec<Landmark>) -> Self {
        Self {
            handedness,
            timestamp,
            landmarks,
        }
    }
}

// ----------------------------------------------------------------------------
// HandFrame: validated
// ----------------------------------------------------------------------------

/// A validated hand frame. Landmarks are stored in identifier order.
#[derive(Clone, Debug, PartialEq)]
pub struct HandFrame {
    handedness: Handedness,
    timestamp: Duration,
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    /// Validate a raw frame.
    ///
    /// Rejects frames without exactly 21 landmarks, with identifiers outside
    /// 0..=20 or repeated, or with non-finite coordinates.
    pub fn from_raw(raw: &RawHandFrame) -> Result<Self> {
        if raw.landmarks.len() != LANDMARK_COUNT {
            return Err(anyhow!(
                "malformed frame: expected {} landmarks, got {}",
                LANDMARK_COUNT,
                raw.landmarks.len()
            ));
        }

        let mut ordered = [Landmark::default(); LANDMARK_COUNT];
        let mut seen = [false; LANDMARK_COUNT];
        for lm in &raw.landmarks {
            let idx = lm.id as usize;
            if idx >= LANDMARK_COUNT {
                return Err(anyhow!("malformed frame: landmark id {} out of range", lm.id));
            }
            if seen[idx] {
                return Err(anyhow!("malformed frame: duplicate landmark id {}", lm.id));
            }
            let depth_ok = lm.z.map_or(true, f32::is_finite);
            if !lm.x.is_finite() || !lm.y.is_finite() || !depth_ok {
                return Err(anyhow!(
                    "malformed frame: landmark {} has non-finite coordinates",
                    lm.id
                ));
            }
            seen[idx] = true;
            ordered[idx] = *lm;
        }

        Ok(Self {
            handedness: raw.handedness,
            timestamp: raw.timestamp,
            landmarks: ordered,
        })
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Landmark by identifier. Panics if `id >= LANDMARK_COUNT`.
    pub fn landmark(&self, id: usize) -> &Landmark {
        &self.landmarks[id]
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    /// Landmark position scaled to pixel-equivalent units.
    pub fn point(&self, id: usize, size: FrameSize) -> Point {
        let lm = &self.landmarks[id];
        Point::new(lm.x * size.width as f32, lm.y * size.height as f32)
    }
}

// ----------------------------------------------------------------------------
// Tick
// ----------------------------------------------------------------------------

/// One processing step: the hands seen and the hands explicitly reported gone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tick {
    pub timestamp: Duration,
    pub frames: Vec<RawHandFrame>,
    pub absent: Vec<Handedness>,
}

impl Tick {
    pub fn new(timestamp: Duration) -> Self {
        Self {
            timestamp,
            frames: Vec::new(),
            absent: Vec::new(),
        }
    }

    pub fn with_frame(mut self, frame: RawHandFrame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn with_absent(mut self, hand: Handedness) -> Self {
        self.absent.push(hand);
        self
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
