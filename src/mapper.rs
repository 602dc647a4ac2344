//! Gesture → playback command mapping.

use crate::{GestureKind, PlaybackCommand};

/// Map an admitted gesture to the command it drives.
///
/// Pure. Pinch start/end and unbound finger counts map to nothing; the caller
/// is responsible for cooldown gating before calling this.
pub fn map_gesture(kind: &GestureKind) -> Option<PlaybackCommand> {
    match *kind {
        GestureKind::SwipeLeft => Some(PlaybackCommand::Previous),
        GestureKind::SwipeRight => Some(PlaybackCommand::Next),
        GestureKind::FistClosed => Some(PlaybackCommand::TogglePlayPause),
        GestureKind::PeaceSign => Some(PlaybackCommand::VolumeUp),
        GestureKind::ThreeFingers => Some(PlaybackCommand::VolumeDown),
        GestureKind::PinchScrubMove(offset) => Some(PlaybackCommand::Seek(offset)),
        GestureKind::PinchScrubStart | GestureKind::PinchScrubEnd | GestureKind::Other(_) => None,
    }
}
