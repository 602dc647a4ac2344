//! Landmark ingestion sources.
//!
//! This module provides the sources that stand in for the perception model:
//! - Replay files in the JSON-lines tick format (or stdin)
//! - A scripted synthetic hand (`stub://`, demos and tests)
//!
//! All sources produce `Tick` instances that flow into the engine. The
//! ingestion layer is responsible for:
//! - Timestamping ticks monotonically
//! - Reporting hand absence explicitly
//!
//! The ingestion layer MUST NOT validate or repair landmark sets; that is the
//! engine's job, so rejected frames are counted in one place.

pub mod file;
pub mod wire;

pub use file::{LandmarkSource, SourceConfig, SourceStats};
pub use wire::{parse_tick_line, tick_to_line, TickRecord};
