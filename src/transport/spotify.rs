//! Spotify Web API playback sink (feature: spotify-web).
//!
//! Authentication is out of scope here: the sink is handed a bearer token
//! and uses it as-is. Every command is one or two blocking HTTP calls; a
//! failed call surfaces as `Err` and is not retried.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::time::{Duration, Instant};
use url::Url;

use super::seek::{SeekPlanner, TrackPosition};
use super::PlaybackSink;
use crate::config::{PlaybackSettings, ScrubOffsetMode};
use crate::PlaybackCommand;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct PlaybackState {
    #[serde(default)]
    is_playing: bool,
    progress_ms: Option<u64>,
    device: Option<DeviceState>,
    item: Option<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct DeviceState {
    volume_percent: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    duration_ms: u64,
}

/// Endpoint that flips the current state; an idle or missing player starts playing.
fn toggle_path(state: Option<&PlaybackState>) -> &'static str {
    match state {
        Some(state) if state.is_playing => "me/player/pause",
        _ => "me/player/play",
    }
}

fn volume_target(current: u8, delta: i16) -> u8 {
    (i16::from(current) + delta).clamp(0, 100) as u8
}

pub struct SpotifySink {
    agent: ureq::Agent,
    api_base: String,
    token: String,
    volume_step: u8,
    planner: SeekPlanner,
}

impl SpotifySink {
    pub fn new(settings: &PlaybackSettings, offset_mode: ScrubOffsetMode) -> Result<Self> {
        let base = Url::parse(&settings.api_base)
            .with_context(|| format!("invalid spotify api base {}", settings.api_base))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!(
                "spotify api base must be http(s), got {}",
                base.scheme()
            ));
        }
        let token = settings
            .access_token
            .clone()
            .ok_or_else(|| anyhow!("spotify sink requires an access token"))?;

        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Ok(Self {
            agent,
            api_base: base.as_str().trim_end_matches('/').to_string(),
            token,
            volume_step: settings.volume_step,
            planner: SeekPlanner::new(
                offset_mode,
                settings.seek_ms_per_px,
                settings.min_seek_ms,
                settings.seek_interval,
            ),
        })
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = format!("{}/{}", self.api_base, path);
        self.agent
            .request(method, &url)
            .set("Authorization", &format!("Bearer {}", self.token))
    }

    fn send(&self, method: &str, path: &str, query: &[(&str, String)]) -> Result<()> {
        let mut request = self.request(method, path);
        for (key, value) in query {
            request = request.query(key, value);
        }
        request
            .send_string("")
            .map_err(|e| anyhow!("spotify {} /{} failed: {}", method, path, e))?;
        Ok(())
    }

    /// Current playback, or `None` when no device is active (HTTP 204).
    fn playback_state(&self) -> Result<Option<PlaybackState>> {
        let response = self
            .request("GET", "me/player")
            .call()
            .map_err(|e| anyhow!("spotify GET /me/player failed: {}", e))?;
        if response.status() == 204 {
            return Ok(None);
        }
        let body = response
            .into_string()
            .context("read spotify playback state")?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let state = serde_json::from_str(&body).context("parse spotify playback state")?;
        Ok(Some(state))
    }

    fn toggle_play_pause(&self) -> Result<()> {
        let state = self.playback_state()?;
        self.send("PUT", toggle_path(state.as_ref()), &[])
    }

    fn adjust_volume(&self, delta: i16) -> Result<()> {
        let current = self
            .playback_state()?
            .and_then(|state| state.device)
            .and_then(|device| device.volume_percent)
            .ok_or_else(|| anyhow!("no active device reports a volume"))?;
        let target = volume_target(current, delta);
        log::debug!("spotify volume {} -> {}", current, target);
        self.send(
            "PUT",
            "me/player/volume",
            &[("volume_percent", target.to_string())],
        )
    }

    fn seek(&mut self, offset_px: f32) -> Result<()> {
        if self.planner.needs_anchor() {
            let state = self
                .playback_state()?
                .ok_or_else(|| anyhow!("no active playback to scrub"))?;
            let duration_ms = state
                .item
                .map(|item| item.duration_ms)
                .ok_or_else(|| anyhow!("no track loaded to scrub"))?;
            self.planner.anchor(TrackPosition {
                progress_ms: state.progress_ms.unwrap_or(0),
                duration_ms,
            });
        }
        let Some(target_ms) = self.planner.plan(offset_px, Instant::now()) else {
            return Ok(());
        };
        self.send(
            "PUT",
            "me/player/seek",
            &[("position_ms", target_ms.to_string())],
        )
    }
}

impl PlaybackSink for SpotifySink {
    fn name(&self) -> &'static str {
        "spotify"
    }

    fn dispatch(&mut self, command: &PlaybackCommand) -> Result<()> {
        match *command {
            PlaybackCommand::Next => self.send("POST", "me/player/next", &[]),
            PlaybackCommand::Previous => self.send("POST", "me/player/previous", &[]),
            PlaybackCommand::TogglePlayPause => self.toggle_play_pause(),
            PlaybackCommand::VolumeUp => self.adjust_volume(self.volume_step as i16),
            PlaybackCommand::VolumeDown => self.adjust_volume(-(self.volume_step as i16)),
            PlaybackCommand::Seek(offset) => self.seek(offset),
        }
    }

    fn scrub_finished(&mut self) {
        self.planner.finish();
    }
}
