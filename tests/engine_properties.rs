use anyhow::{anyhow, Result};
use std::time::Duration;

use gesture_remote::detect::FingerCountDetector;
use gesture_remote::{
    EngineConfig, FrameSize, GestureCategory, GestureController, GestureEngine, GestureKind,
    HandFrame, Handedness, Landmark, MemorySink, PlaybackCommand, PlaybackSink, RawHandFrame,
    Tick, LANDMARK_COUNT,
};

// Power-of-two frame so integer pixel positions survive normalization exactly.
const SIZE: FrameSize = FrameSize {
    width: 1024,
    height: 1024,
};

const OPEN: [bool; 4] = [true, true, true, true];
const FIST: [bool; 4] = [false, false, false, false];
const PEACE: [bool; 4] = [true, true, false, false];

#[derive(Clone, Copy)]
struct Pose {
    wrist: (f32, f32),
    extended: [bool; 4],
    /// Vertical thumb-tip to index-tip gap; `None` keeps the thumb tucked.
    pinch_gap: Option<f32>,
}

impl Pose {
    fn new(wrist_x: f32, extended: [bool; 4]) -> Self {
        Self {
            wrist: (wrist_x, 800.0),
            extended,
            pinch_gap: None,
        }
    }

    fn pinch(wrist_x: f32, gap: f32) -> Self {
        Self {
            pinch_gap: Some(gap),
            ..Self::new(wrist_x, OPEN)
        }
    }
}

fn landmarks(pose: Pose) -> Vec<Landmark> {
    let (wx, wy) = pose.wrist;
    let mut px = vec![(wx, wy); LANDMARK_COUNT];
    let fingers = [(5, 6, 7, 8), (9, 10, 11, 12), (13, 14, 15, 16), (17, 18, 19, 20)];
    for (i, (mcp, pip, dip, tip)) in fingers.into_iter().enumerate() {
        let x = wx + [-60.0, -20.0, 20.0, 60.0][i];
        px[mcp] = (x, wy - 100.0);
        px[pip] = (x, wy - 200.0);
        px[dip] = (x, wy - 200.0);
        px[tip] = if pose.extended[i] {
            (x, wy - 300.0)
        } else {
            (x, wy - 200.0)
        };
    }
    px[1] = (wx - 40.0, wy - 40.0);
    px[2] = (wx - 80.0, wy - 70.0);
    px[3] = (wx - 100.0, wy - 100.0);
    px[4] = match pose.pinch_gap {
        Some(gap) => (px[8].0, px[8].1 + gap),
        None => (wx - 100.0, wy - 40.0),
    };
    px.into_iter()
        .enumerate()
        .map(|(id, (x, y))| Landmark::new(id as u8, x / SIZE.width as f32, y / SIZE.height as f32))
        .collect()
}

fn frame(hand: Handedness, ms: u64, pose: Pose) -> RawHandFrame {
    RawHandFrame::new(hand, Duration::from_millis(ms), landmarks(pose))
}

fn tick(ms: u64, pose: Pose) -> Tick {
    Tick::new(Duration::from_millis(ms)).with_frame(frame(Handedness::Right, ms, pose))
}

fn config() -> EngineConfig {
    EngineConfig {
        frame_size: SIZE,
        ..EngineConfig::default()
    }
}

fn controller() -> GestureController<MemorySink> {
    GestureController::new(config(), MemorySink::new()).expect("valid config")
}

fn is_swipe(kind: &GestureKind) -> bool {
    matches!(kind, GestureKind::SwipeLeft | GestureKind::SwipeRight)
}

fn is_pinch(kind: &GestureKind) -> bool {
    matches!(
        kind,
        GestureKind::PinchScrubStart | GestureKind::PinchScrubMove(_) | GestureKind::PinchScrubEnd
    )
}

#[test]
fn slow_drift_never_swipes() {
    let mut engine = GestureEngine::new(config()).expect("valid config");
    for i in 0..30u64 {
        // 9 steps of 16 px = 144 px per full window.
        let outcome = engine.process_tick(&tick(i * 33, Pose::new(200.0 + 16.0 * i as f32, OPEN)));
        assert!(!outcome.events.iter().any(|e| is_swipe(&e.kind)));
    }
}

#[test]
fn fast_swipe_right_fires_once_and_clears_history() {
    let mut c = controller();
    let mut swipes = Vec::new();
    for i in 0..10u64 {
        let x = 300.0 + 200.0 * i as f32 / 9.0;
        let outcome = c.process_tick(&tick(i * 33, Pose::new(x, OPEN)));
        swipes.extend(outcome.events.into_iter().filter(|e| is_swipe(&e.kind)));
    }
    assert_eq!(swipes.len(), 1);
    assert_eq!(swipes[0].kind, GestureKind::SwipeRight);
    assert_eq!(swipes[0].timestamp, Duration::from_millis(297));
    assert_eq!(c.engine().history_len(Handedness::Right), Some(0));
    assert_eq!(c.sink().commands(), &[PlaybackCommand::Next]);

    // Holding still afterwards does not re-fire.
    for i in 10..25u64 {
        let outcome = c.process_tick(&tick(i * 33, Pose::new(500.0, OPEN)));
        assert!(!outcome.events.iter().any(|e| is_swipe(&e.kind)));
    }
}

#[test]
fn pinch_distances_drive_start_move_end() {
    let mut engine = GestureEngine::new(config()).expect("valid config");
    let steps = [(50.0, 400.0), (50.0, 400.0), (30.0, 400.0), (30.0, 410.0), (50.0, 410.0)];
    let mut kinds = Vec::new();
    let mut commands = Vec::new();
    for (i, (gap, x)) in steps.into_iter().enumerate() {
        let outcome = engine.process_tick(&tick(i as u64 * 33, Pose::pinch(x, gap)));
        kinds.extend(outcome.events.iter().map(|e| e.kind).filter(is_pinch));
        commands.extend(
            outcome
                .commands
                .into_iter()
                .filter(|c| matches!(c, PlaybackCommand::Seek(_))),
        );
    }
    assert_eq!(
        kinds,
        vec![
            GestureKind::PinchScrubStart,
            GestureKind::PinchScrubMove(10.0),
            GestureKind::PinchScrubEnd,
        ]
    );
    assert_eq!(commands, vec![PlaybackCommand::Seek(10.0)]);
    assert!(!engine.is_pinched(Handedness::Right));
}

#[test]
fn fist_repeats_are_gated_by_cooldown() {
    let mut c = controller();
    c.process_tick(&tick(0, Pose::new(500.0, FIST)));
    c.process_tick(&tick(200, Pose::new(500.0, FIST)));
    assert_eq!(c.sink().commands(), &[PlaybackCommand::TogglePlayPause]);

    let mut c = controller();
    c.process_tick(&tick(0, Pose::new(500.0, FIST)));
    c.process_tick(&tick(600, Pose::new(500.0, FIST)));
    assert_eq!(
        c.sink().commands(),
        &[PlaybackCommand::TogglePlayPause, PlaybackCommand::TogglePlayPause]
    );
}

#[test]
fn cooldown_boundary_is_inclusive() {
    let mut c = controller();
    c.process_tick(&tick(0, Pose::new(500.0, FIST)));
    c.process_tick(&tick(499, Pose::new(500.0, FIST)));
    c.process_tick(&tick(500, Pose::new(500.0, FIST)));
    assert_eq!(c.sink().commands().len(), 2);
    assert_eq!(
        c.engine().last_fired(Handedness::Right, GestureCategory::FistClosed),
        Some(Duration::from_millis(500))
    );
}

#[test]
fn finger_count_is_translation_invariant() {
    for (wx, wy) in [(200.0, 700.0), (512.0, 800.0), (800.0, 1000.0), (350.0, 400.0)] {
        let pose = Pose {
            wrist: (wx, wy),
            ..Pose::new(0.0, PEACE)
        };
        let hand = HandFrame::from_raw(&frame(Handedness::Left, 0, pose)).unwrap();
        assert_eq!(FingerCountDetector::count(&hand, SIZE), 2);
    }
}

#[test]
fn swipe_cooldown_does_not_block_peace_sign() {
    let mut c = controller();
    for i in 0..10u64 {
        let x = 700.0 - 25.0 * i as f32;
        c.process_tick(&tick(i * 33, Pose::new(x, OPEN)));
    }
    assert_eq!(c.sink().commands(), &[PlaybackCommand::Previous]);

    let outcome = c.process_tick(&tick(330, Pose::new(475.0, PEACE)));
    assert_eq!(outcome.commands, vec![PlaybackCommand::VolumeUp]);
}

#[test]
fn malformed_frame_changes_nothing() {
    let mut engine = GestureEngine::new(config()).expect("valid config");
    engine.process_tick(&tick(0, Pose::new(500.0, FIST)));
    engine.process_tick(&tick(33, Pose::new(510.0, FIST)));
    let before_history = engine.history_len(Handedness::Right);
    let before_fired = engine.last_fired(Handedness::Right, GestureCategory::FistClosed);

    let mut bad = frame(Handedness::Right, 66, Pose::new(520.0, FIST));
    bad.landmarks.truncate(18);
    let outcome = engine.process_frame(&bad);

    assert!(outcome.events.is_empty());
    assert!(outcome.commands.is_empty());
    assert_eq!(engine.history_len(Handedness::Right), before_history);
    assert_eq!(
        engine.last_fired(Handedness::Right, GestureCategory::FistClosed),
        before_fired
    );
    assert_eq!(engine.stats().frames_rejected, 1);
    assert_eq!(engine.stats().frames_processed, 2);
}

#[test]
fn malformed_left_hand_does_not_disturb_right() {
    let mut engine = GestureEngine::new(config()).expect("valid config");
    let mut bad = frame(Handedness::Left, 0, Pose::new(300.0, FIST));
    bad.landmarks[3].x = f32::NAN;
    let tick = Tick::new(Duration::ZERO)
        .with_frame(bad)
        .with_frame(frame(Handedness::Right, 0, Pose::new(600.0, FIST)));

    let outcome = engine.process_tick(&tick);
    assert_eq!(outcome.commands, vec![PlaybackCommand::TogglePlayPause]);
    assert!(!engine.is_tracking(Handedness::Left));
    assert!(engine.is_tracking(Handedness::Right));
}

#[test]
fn hand_loss_resets_history_and_cooldown() {
    let mut c = controller();
    c.process_tick(&tick(0, Pose::new(500.0, FIST)));
    c.process_tick(&tick(33, Pose::new(500.0, FIST)));
    assert_eq!(c.engine().history_len(Handedness::Right), Some(2));

    c.process_tick(&Tick::new(Duration::from_millis(66)).with_absent(Handedness::Right));
    assert_eq!(c.engine().history_len(Handedness::Right), None);

    // Within the old cooldown window, but the hand starts fresh.
    let outcome = c.process_tick(&tick(100, Pose::new(500.0, FIST)));
    assert_eq!(outcome.commands, vec![PlaybackCommand::TogglePlayPause]);
    assert_eq!(c.engine().history_len(Handedness::Right), Some(1));
    assert_eq!(c.stats().hands_lost, 1);
}

#[test]
fn losing_a_pinched_hand_ends_the_scrub() {
    let mut c = controller();
    c.process_tick(&tick(0, Pose::pinch(400.0, 20.0)));
    assert!(c.engine().is_pinched(Handedness::Right));

    let outcome =
        c.process_tick(&Tick::new(Duration::from_millis(33)).with_absent(Handedness::Right));
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].kind, GestureKind::PinchScrubEnd);
    assert_eq!(outcome.events[0].timestamp, Duration::from_millis(33));
    assert!(outcome.scrub_ended);
    assert_eq!(c.sink().scrubs_finished(), 1);
}

#[test]
fn hands_keep_separate_cooldowns() {
    let mut c = controller();
    let tick = Tick::new(Duration::ZERO)
        .with_frame(frame(Handedness::Left, 0, Pose::new(300.0, FIST)))
        .with_frame(frame(Handedness::Right, 0, Pose::new(700.0, FIST)));
    let outcome = c.process_tick(&tick);
    assert_eq!(outcome.events.len(), 2);
    assert_eq!(outcome.events[0].hand, Handedness::Left);
    assert_eq!(outcome.events[1].hand, Handedness::Right);
    assert_eq!(outcome.commands.len(), 2);
}

/// Rejects toggles, records everything else.
#[derive(Default)]
struct FlakySink {
    delivered: Vec<PlaybackCommand>,
}

impl PlaybackSink for FlakySink {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn dispatch(&mut self, command: &PlaybackCommand) -> Result<()> {
        if *command == PlaybackCommand::TogglePlayPause {
            return Err(anyhow!("player offline"));
        }
        self.delivered.push(*command);
        Ok(())
    }
}

#[test]
fn dispatch_failure_is_counted_and_later_commands_still_flow() {
    let mut c = GestureController::new(config(), FlakySink::default()).expect("valid config");
    c.process_tick(&tick(0, Pose::new(500.0, FIST)));
    c.process_tick(&tick(33, Pose::new(500.0, PEACE)));

    assert_eq!(c.stats().dispatch_failures, 1);
    assert_eq!(c.stats().commands_dispatched, 1);
    assert_eq!(c.sink().delivered, vec![PlaybackCommand::VolumeUp]);
}
