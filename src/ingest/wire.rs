//! Landmark replay wire format: one JSON object per line.
//!
//! ```text
//! {"t": 1.25, "hands": [{"handedness": "right", "landmarks": [{"id": 0, "x": 0.5, "y": 0.8}]}], "absent": ["left"]}
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::frame::{Landmark, RawHandFrame, Tick};
use crate::Handedness;

#[derive(Debug, Serialize, Deserialize)]
pub struct TickRecord {
    /// Monotonic seconds.
    pub t: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hands: Vec<HandRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub absent: Vec<Handedness>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HandRecord {
    pub handedness: Handedness,
    pub landmarks: Vec<LandmarkRecord>,
}

/// A landmark as written on the wire.
///
/// Deliberately wider than `Landmark`: out-of-range ids and missing or null
/// coordinates must still reach the engine, which rejects the whole frame.
#[derive(Debug, Serialize, Deserialize)]
pub struct LandmarkRecord {
    pub id: i64,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl LandmarkRecord {
    /// Ids outside `u8` become 255 and missing coordinates become NaN; both
    /// fail frame validation.
    fn into_landmark(self) -> Landmark {
        Landmark {
            id: u8::try_from(self.id).unwrap_or(u8::MAX),
            x: self.x.unwrap_or(f32::NAN),
            y: self.y.unwrap_or(f32::NAN),
            z: self.z,
        }
    }
}

impl From<&Landmark> for LandmarkRecord {
    fn from(lm: &Landmark) -> Self {
        Self {
            id: lm.id as i64,
            x: Some(lm.x),
            y: Some(lm.y),
            z: lm.z,
        }
    }
}

impl TickRecord {
    pub fn into_tick(self) -> Result<Tick> {
        let timestamp = Duration::try_from_secs_f64(self.t)
            .map_err(|_| anyhow!("invalid tick time {}", self.t))?;
        // Landmark sets are not checked here; the engine rejects bad frames.
        let frames = self
            .hands
            .into_iter()
            .map(|hand| {
                let landmarks = hand
                    .landmarks
                    .into_iter()
                    .map(LandmarkRecord::into_landmark)
                    .collect();
                RawHandFrame::new(hand.handedness, timestamp, landmarks)
            })
            .collect();
        Ok(Tick {
            timestamp,
            frames,
            absent: self.absent,
        })
    }

    pub fn from_tick(tick: &Tick) -> Self {
        Self {
            t: tick.timestamp.as_secs_f64(),
            hands: tick
                .frames
                .iter()
                .map(|frame| HandRecord {
                    handedness: frame.handedness,
                    landmarks: frame.landmarks.iter().map(LandmarkRecord::from).collect(),
                })
                .collect(),
            absent: tick.absent.clone(),
        }
    }
}

/// Parse one replay line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_tick_line(line: &str) -> Result<Option<Tick>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let record: TickRecord = serde_json::from_str(line).context("invalid tick record")?;
    record.into_tick().map(Some)
}

/// Serialize a tick as one replay line (no trailing newline).
pub fn tick_to_line(tick: &Tick) -> Result<String> {
    serde_json::to_string(&TickRecord::from_tick(tick)).context("serialize tick record")
}
