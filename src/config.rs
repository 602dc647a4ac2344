use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::frame::FrameSize;

pub const DEFAULT_SWIPE_THRESHOLD_PX: f32 = 150.0;
pub const DEFAULT_SWIPE_WINDOW: usize = 10;
pub const DEFAULT_PINCH_THRESHOLD_PX: f32 = 40.0;
pub const DEFAULT_COOLDOWN_MS: u64 = 500;

const DEFAULT_SOURCE_PATH: &str = "stub://demo";
const DEFAULT_SOURCE_FPS: u32 = 30;
const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
const DEFAULT_SEEK_MS_PER_PX: f64 = 250.0;
const DEFAULT_VOLUME_STEP: u8 = 10;
const DEFAULT_MIN_SEEK_MS: u64 = 500;
const DEFAULT_SEEK_INTERVAL_MS: u64 = 200;

// -------------------- Engine --------------------

/// How `PinchScrubMove` offsets are measured.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScrubOffsetMode {
    /// Offset from the x position where the pinch started.
    #[default]
    Cumulative,
    /// Offset from the previous pinched frame.
    FrameDelta,
}

impl FromStr for ScrubOffsetMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "cumulative" => Ok(Self::Cumulative),
            "frame_delta" | "frame-delta" => Ok(Self::FrameDelta),
            other => Err(anyhow!(
                "unknown scrub offset mode '{}' (expected cumulative or frame_delta)",
                other
            )),
        }
    }
}

/// Classification tunables. Thresholds are in pixel-equivalent units.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub frame_size: FrameSize,
    pub swipe_threshold_px: f32,
    pub swipe_window: usize,
    pub pinch_threshold_px: f32,
    pub cooldown: Duration,
    pub scrub_offset_mode: ScrubOffsetMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_size: FrameSize::default(),
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
            swipe_window: DEFAULT_SWIPE_WINDOW,
            pinch_threshold_px: DEFAULT_PINCH_THRESHOLD_PX,
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            scrub_offset_mode: ScrubOffsetMode::Cumulative,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame_size.width == 0 || self.frame_size.height == 0 {
            return Err(anyhow!("frame size must be non-zero"));
        }
        if !(self.swipe_threshold_px.is_finite() && self.swipe_threshold_px > 0.0) {
            return Err(anyhow!("swipe threshold must be a positive number"));
        }
        if self.swipe_window < 2 {
            return Err(anyhow!("swipe window must hold at least 2 frames"));
        }
        if !(self.pinch_threshold_px.is_finite() && self.pinch_threshold_px > 0.0) {
            return Err(anyhow!("pinch threshold must be a positive number"));
        }
        Ok(())
    }
}

// -------------------- Daemon --------------------

#[derive(Debug, Deserialize, Default)]
struct GesturedConfigFile {
    frame: Option<FrameConfigFile>,
    swipe: Option<SwipeConfigFile>,
    pinch: Option<PinchConfigFile>,
    cooldown_ms: Option<u64>,
    source: Option<SourceConfigFile>,
    playback: Option<PlaybackConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct FrameConfigFile {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct SwipeConfigFile {
    threshold_px: Option<f32>,
    window: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct PinchConfigFile {
    threshold_px: Option<f32>,
    offset_mode: Option<ScrubOffsetMode>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    path: Option<String>,
    target_fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct PlaybackConfigFile {
    backend: Option<PlaybackBackend>,
    api_base: Option<String>,
    seek_ms_per_px: Option<f64>,
    volume_step: Option<u8>,
    min_seek_ms: Option<u64>,
    seek_interval_ms: Option<u64>,
}

/// Where playback commands go.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackBackend {
    /// Log each command; no remote calls.
    #[default]
    Log,
    /// Spotify Web API (requires the `spotify-web` feature).
    Spotify,
}

impl FromStr for PlaybackBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "spotify" => Ok(Self::Spotify),
            other => Err(anyhow!(
                "unknown playback backend '{}' (expected log or spotify)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GesturedConfig {
    pub engine: EngineConfig,
    pub source: SourceSettings,
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub path: String,
    pub target_fps: u32,
}

#[derive(Debug, Clone)]
pub struct PlaybackSettings {
    pub backend: PlaybackBackend,
    pub api_base: String,
    /// Bearer token; only ever read from the environment.
    pub access_token: Option<String>,
    pub seek_ms_per_px: f64,
    pub volume_step: u8,
    pub min_seek_ms: u64,
    pub seek_interval: Duration,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            backend: PlaybackBackend::Log,
            api_base: DEFAULT_API_BASE.to_string(),
            access_token: None,
            seek_ms_per_px: DEFAULT_SEEK_MS_PER_PX,
            volume_step: DEFAULT_VOLUME_STEP,
            min_seek_ms: DEFAULT_MIN_SEEK_MS,
            seek_interval: Duration::from_millis(DEFAULT_SEEK_INTERVAL_MS),
        }
    }
}

impl GesturedConfig {
    /// Load from `GESTURE_CONFIG` (JSON, or TOML for `*.toml`), then apply
    /// environment overrides and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("GESTURE_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Like `load`, with the config file path given explicitly.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let file_cfg = match config_path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: GesturedConfigFile) -> Self {
        let defaults = EngineConfig::default();
        let frame = file.frame.unwrap_or_default();
        let swipe = file.swipe.unwrap_or_default();
        let pinch = file.pinch.unwrap_or_default();
        let engine = EngineConfig {
            frame_size: FrameSize {
                width: frame.width.unwrap_or(defaults.frame_size.width),
                height: frame.height.unwrap_or(defaults.frame_size.height),
            },
            swipe_threshold_px: swipe.threshold_px.unwrap_or(defaults.swipe_threshold_px),
            swipe_window: swipe.window.unwrap_or(defaults.swipe_window),
            pinch_threshold_px: pinch.threshold_px.unwrap_or(defaults.pinch_threshold_px),
            cooldown: file
                .cooldown_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.cooldown),
            scrub_offset_mode: pinch.offset_mode.unwrap_or(defaults.scrub_offset_mode),
        };

        let source = file.source.unwrap_or_default();
        let source = SourceSettings {
            path: source
                .path
                .unwrap_or_else(|| DEFAULT_SOURCE_PATH.to_string()),
            target_fps: source.target_fps.unwrap_or(DEFAULT_SOURCE_FPS),
        };

        let playback_defaults = PlaybackSettings::default();
        let playback = file.playback.unwrap_or_default();
        let playback = PlaybackSettings {
            backend: playback.backend.unwrap_or(playback_defaults.backend),
            api_base: playback.api_base.unwrap_or(playback_defaults.api_base),
            access_token: None,
            seek_ms_per_px: playback
                .seek_ms_per_px
                .unwrap_or(playback_defaults.seek_ms_per_px),
            volume_step: playback
                .volume_step
                .unwrap_or(playback_defaults.volume_step),
            min_seek_ms: playback
                .min_seek_ms
                .unwrap_or(playback_defaults.min_seek_ms),
            seek_interval: playback
                .seek_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(playback_defaults.seek_interval),
        };

        Self {
            engine,
            source,
            playback,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("GESTURE_SOURCE") {
            if !path.trim().is_empty() {
                self.source.path = path;
            }
        }
        if let Ok(value) = std::env::var("GESTURE_SWIPE_THRESHOLD_PX") {
            self.engine.swipe_threshold_px = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("GESTURE_SWIPE_THRESHOLD_PX must be a number"))?;
        }
        if let Ok(value) = std::env::var("GESTURE_PINCH_THRESHOLD_PX") {
            self.engine.pinch_threshold_px = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("GESTURE_PINCH_THRESHOLD_PX must be a number"))?;
        }
        if let Ok(value) = std::env::var("GESTURE_COOLDOWN_MS") {
            let ms: u64 = value.trim().parse().map_err(|_| {
                anyhow!("GESTURE_COOLDOWN_MS must be an integer number of milliseconds")
            })?;
            self.engine.cooldown = Duration::from_millis(ms);
        }
        if let Ok(value) = std::env::var("GESTURE_SCRUB_MODE") {
            self.engine.scrub_offset_mode = value.parse()?;
        }
        if let Ok(value) = std::env::var("GESTURE_PLAYBACK") {
            if !value.trim().is_empty() {
                self.playback.backend = value.parse()?;
            }
        }
        if let Ok(token) = std::env::var("SPOTIFY_ACCESS_TOKEN") {
            if !token.trim().is_empty() {
                self.playback.access_token = Some(token.trim().to_string());
            }
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        self.engine.validate()?;

        if self.source.path.trim().is_empty() {
            return Err(anyhow!("source path must not be empty"));
        }
        if self.source.target_fps == 0 {
            return Err(anyhow!("source target_fps must be >= 1"));
        }
        if !(self.playback.seek_ms_per_px.is_finite() && self.playback.seek_ms_per_px > 0.0) {
            return Err(anyhow!("playback seek_ms_per_px must be a positive number"));
        }
        if self.playback.volume_step == 0 || self.playback.volume_step > 100 {
            return Err(anyhow!("playback volume_step must be within 1..=100"));
        }
        self.playback.api_base = self.playback.api_base.trim_end_matches('/').to_string();
        if self.playback.backend == PlaybackBackend::Spotify
            && self.playback.access_token.is_none()
        {
            return Err(anyhow!(
                "spotify playback requires SPOTIFY_ACCESS_TOKEN to be set"
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<GesturedConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
