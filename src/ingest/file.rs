//! Landmark tick source.
//!
//! `LandmarkSource` stands in for the perception model. It reads ticks from:
//! - a replay file in the JSON-lines wire format (or `-` for stdin)
//! - a scripted synthetic hand (`stub://` paths) for demos and tests
//!
//! The source never validates landmark sets; malformed hands are passed
//! through so the engine can reject and count them. A replay line that is
//! not a tick record at all is logged, counted and skipped; only I/O errors
//! end a replay early.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::time::Duration;

use super::wire::parse_tick_line;
use crate::frame::{landmarks, Landmark, RawHandFrame, Tick, LANDMARK_COUNT};
use crate::Handedness;

/// Configuration for a landmark source.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// Replay file path, `-` for stdin, or `stub://<name>` for the synthetic hand.
    pub path: String,
    /// Tick rate of the synthetic hand. Replay files carry their own times.
    pub target_fps: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: "stub://demo".to_string(),
            target_fps: 30,
        }
    }
}

/// Landmark tick source.
pub struct LandmarkSource {
    backend: SourceBackend,
}

enum SourceBackend {
    Replay(ReplaySource),
    Synthetic(SyntheticHandSource),
}

impl LandmarkSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        if config.path.trim().is_empty() {
            return Err(anyhow!("landmark source path must not be empty"));
        }
        if config.path.starts_with("stub://") {
            if config.target_fps == 0 {
                return Err(anyhow!("synthetic source target_fps must be >= 1"));
            }
            return Ok(Self {
                backend: SourceBackend::Synthetic(SyntheticHandSource::new(config)),
            });
        }
        if config.path.contains("://") {
            return Err(anyhow!(
                "landmark source only supports local paths, '-' or stub:// (got {})",
                config.path
            ));
        }
        Ok(Self {
            backend: SourceBackend::Replay(ReplaySource::new(config)),
        })
    }

    /// Open the source.
    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            SourceBackend::Replay(source) => source.connect(),
            SourceBackend::Synthetic(source) => source.connect(),
        }
    }

    /// Next tick, or `None` once a replay is exhausted. The synthetic hand never ends.
    ///
    /// Errors are I/O failures; unparseable replay lines are skipped.
    pub fn next_tick(&mut self) -> Result<Option<Tick>> {
        match &mut self.backend {
            SourceBackend::Replay(source) => source.next_tick(),
            SourceBackend::Synthetic(source) => Ok(Some(source.next_tick())),
        }
    }

    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            SourceBackend::Replay(source) => source.is_healthy(),
            SourceBackend::Synthetic(_) => true,
        }
    }

    pub fn stats(&self) -> SourceStats {
        match &self.backend {
            SourceBackend::Replay(source) => source.stats(),
            SourceBackend::Synthetic(source) => source.stats(),
        }
    }
}

/// Statistics for a landmark source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceStats {
    pub ticks_read: u64,
    /// Replay lines skipped because they were not valid tick records.
    pub lines_rejected: u64,
    pub path: String,
}

// ----------------------------------------------------------------------------
// Replay source (JSON lines)
// ----------------------------------------------------------------------------

struct ReplaySource {
    config: SourceConfig,
    reader: Option<Box<dyn BufRead>>,
    line_no: u64,
    ticks_read: u64,
    lines_rejected: u64,
    exhausted: bool,
}

impl ReplaySource {
    fn new(config: SourceConfig) -> Self {
        Self {
            config,
            reader: None,
            line_no: 0,
            ticks_read: 0,
            lines_rejected: 0,
            exhausted: false,
        }
    }

    fn connect(&mut self) -> Result<()> {
        let reader: Box<dyn BufRead> = if self.config.path == "-" {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file = File::open(&self.config.path)
                .with_context(|| format!("open landmark replay {}", self.config.path))?;
            Box::new(BufReader::new(file))
        };
        self.reader = Some(reader);
        self.line_no = 0;
        self.exhausted = false;
        log::info!("LandmarkSource: replaying {}", self.config.path);
        Ok(())
    }

    fn next_tick(&mut self) -> Result<Option<Tick>> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| anyhow!("landmark source not connected"))?;
        let mut line = String::new();
        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .with_context(|| format!("read {}", self.config.path))?;
            if read == 0 {
                if !self.exhausted {
                    log::info!(
                        "LandmarkSource: {} exhausted after {} ticks",
                        self.config.path,
                        self.ticks_read
                    );
                }
                self.exhausted = true;
                return Ok(None);
            }
            self.line_no += 1;
            match parse_tick_line(&line) {
                Ok(Some(tick)) => {
                    self.ticks_read += 1;
                    return Ok(Some(tick));
                }
                Ok(None) => {}
                Err(e) => {
                    self.lines_rejected += 1;
                    log::warn!(
                        "LandmarkSource: {} line {} skipped: {:#}",
                        self.config.path,
                        self.line_no,
                        e
                    );
                }
            }
        }
    }

    fn is_healthy(&self) -> bool {
        self.reader.is_some() && !self.exhausted
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            ticks_read: self.ticks_read,
            lines_rejected: self.lines_rejected,
            path: self.config.path.clone(),
        }
    }
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for demos and tests
// ----------------------------------------------------------------------------

/// Hand poses the synthetic script cycles through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pose {
    /// Four fingers up, thumb tucked: an unbound count.
    Open,
    Fist,
    Peace,
    Three,
    /// Thumb tip on the index tip, other fingers up.
    Pinch,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Step {
    /// Hold a pose with the wrist moving `dx` per frame.
    Hold { pose: Pose, frames: u32, dx: f32 },
    /// One tick with the hand reported absent.
    Lost,
}

const SWIPE_STEP: f32 = 0.03;
const SCRUB_STEP: f32 = 0.01;
const WRIST_Y: f32 = 0.7;
const WRIST_X_START: f32 = 0.35;

/// One cycle of the demo script. `swipe_dx` alternates sign between cycles
/// so the wrist swings back and forth.
fn script(swipe_dx: f32) -> [Step; 12] {
    [
        Step::Hold { pose: Pose::Open, frames: 10, dx: swipe_dx },
        Step::Hold { pose: Pose::Open, frames: 3, dx: 0.0 },
        Step::Hold { pose: Pose::Fist, frames: 3, dx: 0.0 },
        Step::Hold { pose: Pose::Open, frames: 3, dx: 0.0 },
        Step::Hold { pose: Pose::Peace, frames: 3, dx: 0.0 },
        Step::Hold { pose: Pose::Open, frames: 3, dx: 0.0 },
        Step::Hold { pose: Pose::Three, frames: 3, dx: 0.0 },
        Step::Hold { pose: Pose::Open, frames: 3, dx: 0.0 },
        Step::Hold { pose: Pose::Pinch, frames: 6, dx: SCRUB_STEP },
        Step::Hold { pose: Pose::Pinch, frames: 6, dx: -SCRUB_STEP },
        Step::Hold { pose: Pose::Open, frames: 3, dx: 0.0 },
        Step::Lost,
    ]
}

struct SyntheticHandSource {
    config: SourceConfig,
    tick_count: u64,
    cycle: u64,
    step: usize,
    frame_in_step: u32,
    wrist_x: f32,
}

impl SyntheticHandSource {
    fn new(config: SourceConfig) -> Self {
        Self {
            config,
            tick_count: 0,
            cycle: 0,
            step: 0,
            frame_in_step: 0,
            wrist_x: WRIST_X_START,
        }
    }

    fn connect(&mut self) -> Result<()> {
        log::info!(
            "LandmarkSource: connected to {} (synthetic, {} fps)",
            self.config.path,
            self.config.target_fps
        );
        Ok(())
    }

    fn next_tick(&mut self) -> Tick {
        let timestamp =
            Duration::from_secs_f64(self.tick_count as f64 / self.config.target_fps as f64);
        self.tick_count += 1;

        let swipe_dx = if self.cycle % 2 == 0 {
            SWIPE_STEP
        } else {
            -SWIPE_STEP
        };
        let steps = script(swipe_dx);
        match steps[self.step] {
            Step::Lost => {
                self.advance(1, steps.len());
                Tick::new(timestamp).with_absent(Handedness::Right)
            }
            Step::Hold { pose, frames, dx } => {
                if self.frame_in_step > 0 {
                    self.wrist_x += dx;
                }
                let landmarks = pose_landmarks(pose, self.wrist_x, WRIST_Y);
                self.advance(frames, steps.len());
                Tick::new(timestamp).with_frame(RawHandFrame::new(
                    Handedness::Right,
                    timestamp,
                    landmarks,
                ))
            }
        }
    }

    fn advance(&mut self, frames: u32, step_count: usize) {
        self.frame_in_step += 1;
        if self.frame_in_step < frames {
            return;
        }
        self.frame_in_step = 0;
        self.step += 1;
        if self.step == step_count {
            self.step = 0;
            self.cycle += 1;
        }
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            ticks_read: self.tick_count,
            lines_rejected: 0,
            path: self.config.path.clone(),
        }
    }
}

/// Landmarks for `pose` with the wrist at (`wx`, `wy`), normalized coordinates.
fn pose_landmarks(pose: Pose, wx: f32, wy: f32) -> Vec<Landmark> {
    // (mcp, pip, dip, tip) and horizontal offset per finger.
    const FINGERS: [([usize; 4], f32); 4] = [
        (
            [
                landmarks::INDEX_FINGER_MCP,
                landmarks::INDEX_FINGER_PIP,
                landmarks::INDEX_FINGER_DIP,
                landmarks::INDEX_FINGER_TIP,
            ],
            -0.06,
        ),
        (
            [
                landmarks::MIDDLE_FINGER_MCP,
                landmarks::MIDDLE_FINGER_PIP,
                landmarks::MIDDLE_FINGER_DIP,
                landmarks::MIDDLE_FINGER_TIP,
            ],
            -0.02,
        ),
        (
            [
                landmarks::RING_FINGER_MCP,
                landmarks::RING_FINGER_PIP,
                landmarks::RING_FINGER_DIP,
                landmarks::RING_FINGER_TIP,
            ],
            0.02,
        ),
        (
            [
                landmarks::PINKY_MCP,
                landmarks::PINKY_PIP,
                landmarks::PINKY_DIP,
                landmarks::PINKY_TIP,
            ],
            0.06,
        ),
    ];

    let extended = match pose {
        Pose::Open | Pose::Pinch => [true, true, true, true],
        Pose::Fist => [false, false, false, false],
        Pose::Peace => [true, true, false, false],
        Pose::Three => [true, true, true, false],
    };

    let mut lms: Vec<Landmark> = (0..LANDMARK_COUNT as u8)
        .map(|id| Landmark::new(id, wx, wy))
        .collect();
    let mut set = |id: usize, x: f32, y: f32| lms[id] = Landmark::new(id as u8, x, y);

    for (([mcp, pip, dip, tip], offset), up) in FINGERS.iter().zip(extended) {
        let x = wx + offset;
        set(*mcp, x, wy - 0.10);
        set(*pip, x, wy - 0.15);
        if up {
            set(*dip, x, wy - 0.20);
            set(*tip, x, wy - 0.25);
        } else {
            // Curled: tip level with the PIP joint.
            set(*dip, x, wy - 0.13);
            set(*tip, x, wy - 0.15);
        }
    }

    let thumb_ip_x = wx - 0.10;
    set(landmarks::THUMB_CMC, wx - 0.05, wy - 0.03);
    set(landmarks::THUMB_MCP, wx - 0.08, wy - 0.06);
    set(landmarks::THUMB_IP, thumb_ip_x, wy - 0.09);
    if pose == Pose::Pinch {
        set(landmarks::THUMB_TIP, wx - 0.055, wy - 0.24);
    } else {
        set(landmarks::THUMB_TIP, thumb_ip_x, wy - 0.02);
    }
    lms
}
