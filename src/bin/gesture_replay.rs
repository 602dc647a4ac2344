//! gesture_replay - run a landmark recording through the engine offline
//!
//! Prints one JSON object per gesture event and per admitted command to
//! stdout, then a summary line. Nothing is sent to a playback backend.

use anyhow::{anyhow, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

use gesture_remote::{
    EngineConfig, EngineStats, FrameSize, GestureController, GestureKind, Handedness,
    LandmarkSource, MemorySink, PlaybackCommand, ScrubOffsetMode, SourceConfig,
};

/// Ticks to run when replaying the endless synthetic hand without a limit.
const DEFAULT_SYNTHETIC_TICKS: u64 = 300;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Replay file (JSON lines), `-` for stdin, or `stub://demo`.
    input: String,
    /// Frame width used to scale normalized coordinates.
    #[arg(long, default_value_t = 640)]
    width: u32,
    /// Frame height used to scale normalized coordinates.
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// Scrub offset mode: cumulative or frame_delta.
    #[arg(long, default_value = "cumulative")]
    scrub_mode: String,
    /// Cooldown between repeats of a gated gesture, in milliseconds.
    #[arg(long, default_value_t = gesture_remote::config::DEFAULT_COOLDOWN_MS)]
    cooldown_ms: u64,
    /// Synthetic source rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,
    /// Stop after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Print commands only.
    #[arg(long, default_value_t = false)]
    commands_only: bool,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputLine<'a> {
    Event {
        t: f64,
        hand: Handedness,
        #[serde(flatten)]
        kind: &'a GestureKind,
    },
    Command {
        t: f64,
        #[serde(flatten)]
        command: &'a PlaybackCommand,
    },
    Summary {
        ticks: u64,
        lines_rejected: u64,
        frames_processed: u64,
        frames_rejected: u64,
        events_emitted: u64,
        commands_dispatched: u64,
        hands_lost: u64,
    },
}

impl OutputLine<'_> {
    fn summary(ticks: u64, lines_rejected: u64, stats: &EngineStats) -> Self {
        OutputLine::Summary {
            ticks,
            lines_rejected,
            frames_processed: stats.frames_processed,
            frames_rejected: stats.frames_rejected,
            events_emitted: stats.events_emitted,
            commands_dispatched: stats.commands_dispatched,
            hands_lost: stats.hands_lost,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = EngineConfig {
        frame_size: FrameSize {
            width: args.width,
            height: args.height,
        },
        cooldown: Duration::from_millis(args.cooldown_ms),
        scrub_offset_mode: args.scrub_mode.parse::<ScrubOffsetMode>()?,
        ..EngineConfig::default()
    };

    let synthetic = args.input.starts_with("stub://");
    let max_ticks = match (args.max_ticks, synthetic) {
        (Some(max), _) => Some(max),
        (None, true) => Some(DEFAULT_SYNTHETIC_TICKS),
        (None, false) => None,
    };
    if args.fps == 0 {
        return Err(anyhow!("fps must be >= 1"));
    }

    let mut source = LandmarkSource::new(SourceConfig {
        path: args.input.clone(),
        target_fps: args.fps,
    })?;
    source.connect()?;

    let mut controller = GestureController::new(config, MemorySink::new())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut ticks = 0u64;

    while max_ticks.map_or(true, |max| ticks < max) {
        let Some(tick) = source.next_tick()? else {
            break;
        };
        ticks += 1;

        let outcome = controller.process_tick(&tick);
        let t = tick.timestamp.as_secs_f64();
        if !args.commands_only {
            for event in &outcome.events {
                let line = OutputLine::Event {
                    t: event.timestamp.as_secs_f64(),
                    hand: event.hand,
                    kind: &event.kind,
                };
                writeln!(out, "{}", serde_json::to_string(&line)?)?;
            }
        }
        for command in controller.sink_mut().drain() {
            let line = OutputLine::Command { t, command: &command };
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
    }

    let summary = OutputLine::summary(ticks, source.stats().lines_rejected, controller.stats());
    writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    out.flush()?;
    Ok(())
}
