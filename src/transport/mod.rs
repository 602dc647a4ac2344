//! Playback sinks.
//!
//! A sink is the boundary to the playback backend. It receives one
//! `PlaybackCommand` per admitted gesture and owns everything past that:
//! authentication, API-level rate limiting and delivery. Failures come back
//! as `Err` and are treated as non-fatal by the caller; sinks never retry on
//! the engine's behalf.

mod seek;
#[cfg(feature = "spotify-web")]
pub mod spotify;

pub use seek::{SeekPlanner, TrackPosition};
#[cfg(feature = "spotify-web")]
pub use spotify::SpotifySink;

use anyhow::Result;

use crate::PlaybackCommand;

/// Destination for playback commands.
pub trait PlaybackSink {
    /// Sink identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Deliver one command.
    fn dispatch(&mut self, command: &PlaybackCommand) -> Result<()>;

    /// A pinch-scrub ended; drop any seek anchor held for it.
    fn scrub_finished(&mut self) {}
}

impl<S: PlaybackSink + ?Sized> PlaybackSink for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn dispatch(&mut self, command: &PlaybackCommand) -> Result<()> {
        (**self).dispatch(command)
    }

    fn scrub_finished(&mut self) {
        (**self).scrub_finished()
    }
}

/// Logs every command at info level. Used when no backend is configured.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl PlaybackSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn dispatch(&mut self, command: &PlaybackCommand) -> Result<()> {
        log::info!("playback command: {}", command);
        Ok(())
    }
}

/// Records commands in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    commands: Vec<PlaybackCommand>,
    scrubs_finished: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PlaybackCommand] {
        &self.commands
    }

    pub fn scrubs_finished(&self) -> usize {
        self.scrubs_finished
    }

    /// Take the recorded commands, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<PlaybackCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl PlaybackSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn dispatch(&mut self, command: &PlaybackCommand) -> Result<()> {
        self.commands.push(*command);
        Ok(())
    }

    fn scrub_finished(&mut self) {
        self.scrubs_finished += 1;
    }
}
