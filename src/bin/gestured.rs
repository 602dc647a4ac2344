//! gestured - gesture remote daemon
//!
//! This daemon:
//! 1. Reads landmark ticks from the configured source (replay file or stub://)
//! 2. Classifies them into gestures, per hand
//! 3. Gates one-shot gestures with per-category cooldowns
//! 4. Dispatches the resulting playback commands to the configured backend

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gesture_remote::config::{GesturedConfig, PlaybackBackend, PlaybackSettings};
use gesture_remote::{
    GestureController, LandmarkSource, LogSink, PlaybackSink, ScrubOffsetMode, SourceConfig,
};

const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (JSON, or TOML for *.toml).
    #[arg(long, env = "GESTURE_CONFIG")]
    config: Option<PathBuf>,
    /// Stop after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Process replay files as fast as possible instead of at target_fps.
    #[arg(long, default_value_t = false)]
    no_pacing: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = GesturedConfig::load_from(args.config.as_deref())?;

    let mut source = LandmarkSource::new(SourceConfig {
        path: config.source.path.clone(),
        target_fps: config.source.target_fps,
    })?;
    source.connect()?;

    let sink = build_sink(&config.playback, config.engine.scrub_offset_mode)?;
    let mut controller = GestureController::new(config.engine.clone(), sink)?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    let frame_interval = Duration::from_secs_f64(1.0 / config.source.target_fps as f64);
    let mut last_health_log = Instant::now();
    let mut ticks = 0u64;

    log::info!(
        "gestured running. source={} playback={:?}",
        config.source.path,
        config.playback.backend
    );
    log::info!(
        "swipe_threshold_px={}, pinch_threshold_px={}, cooldown={:?}, scrub_mode={:?}",
        config.engine.swipe_threshold_px,
        config.engine.pinch_threshold_px,
        config.engine.cooldown,
        config.engine.scrub_offset_mode
    );

    while running.load(Ordering::SeqCst) {
        if args.max_ticks.is_some_and(|max| ticks >= max) {
            log::info!("reached max ticks ({})", ticks);
            break;
        }
        let started = Instant::now();

        let Some(tick) = source.next_tick()? else {
            log::info!("source exhausted");
            break;
        };
        ticks += 1;

        let outcome = controller.process_tick(&tick);
        for event in &outcome.events {
            log::debug!(
                "{} hand at {:.3}s: {:?}",
                event.hand,
                event.timestamp.as_secs_f64(),
                event.kind
            );
        }

        if last_health_log.elapsed() >= HEALTH_LOG_INTERVAL {
            let stats = controller.stats();
            let source_stats = source.stats();
            log::info!(
                "health: source_healthy={}, ticks={}, lines_rejected={}, frames={}, rejected={}, events={}, commands={}, dispatch_failures={}, hands_lost={}",
                source.is_healthy(),
                source_stats.ticks_read,
                source_stats.lines_rejected,
                stats.frames_processed,
                stats.frames_rejected,
                stats.events_emitted,
                stats.commands_dispatched,
                stats.dispatch_failures,
                stats.hands_lost
            );
            last_health_log = Instant::now();
        }

        if !args.no_pacing {
            if let Some(remaining) = frame_interval.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    let stats = controller.stats();
    log::info!(
        "gestured stopped after {} ticks: {} events, {} commands ({} failed), {} frames rejected",
        ticks,
        stats.events_emitted,
        stats.commands_dispatched,
        stats.dispatch_failures,
        stats.frames_rejected
    );
    Ok(())
}

#[cfg_attr(not(feature = "spotify-web"), allow(unused_variables))]
fn build_sink(
    settings: &PlaybackSettings,
    offset_mode: ScrubOffsetMode,
) -> Result<Box<dyn PlaybackSink>> {
    match settings.backend {
        PlaybackBackend::Log => Ok(Box::new(LogSink::new())),
        #[cfg(feature = "spotify-web")]
        PlaybackBackend::Spotify => Ok(Box::new(gesture_remote::transport::SpotifySink::new(
            settings,
            offset_mode,
        )?)),
        #[cfg(not(feature = "spotify-web"))]
        PlaybackBackend::Spotify => Err(anyhow!(
            "spotify playback requires the spotify-web feature"
        )),
    }
}
