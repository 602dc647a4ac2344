//! Gesture controller: the engine wired to a playback sink.
//!
//! The controller is the only place commands leave the crate. A sink error
//! is logged and counted, and the remaining commands of the same frame are
//! still dispatched; recognition never stops because the backend is down.
//!
//! Sinks keep a single seek anchor, so two hands scrubbing at once share it.
//! The sink hears `scrub_finished` only once the last pinched hand lets go.

use anyhow::Result;

use crate::engine::{EngineStats, FrameOutcome, GestureEngine};
use crate::frame::{RawHandFrame, Tick};
use crate::transport::PlaybackSink;
use crate::EngineConfig;

pub struct GestureController<S: PlaybackSink> {
    engine: GestureEngine,
    sink: S,
}

impl<S: PlaybackSink> GestureController<S> {
    pub fn new(config: EngineConfig, sink: S) -> Result<Self> {
        let engine = GestureEngine::new(config)?;
        log::info!("gesture controller using {} sink", sink.name());
        Ok(Self { engine, sink })
    }

    pub fn process_tick(&mut self, tick: &Tick) -> FrameOutcome {
        let outcome = self.engine.process_tick(tick);
        self.dispatch(&outcome);
        outcome
    }

    pub fn process_frame(&mut self, frame: &RawHandFrame) -> FrameOutcome {
        let outcome = self.engine.process_frame(frame);
        self.dispatch(&outcome);
        outcome
    }

    fn dispatch(&mut self, outcome: &FrameOutcome) {
        for command in &outcome.commands {
            match self.sink.dispatch(command) {
                Ok(()) => self.engine.stats_mut().commands_dispatched += 1,
                Err(e) => {
                    self.engine.stats_mut().dispatch_failures += 1;
                    log::warn!("{} sink failed to dispatch {}: {:#}", self.sink.name(), command, e);
                }
            }
        }
        if outcome.scrub_ended && !self.engine.any_pinched() {
            self.sink.scrub_finished();
        }
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn stats(&self) -> &EngineStats {
        self.engine.stats()
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
