//! Frame loop - fixed 20ms pacing around the controller
//!
//! Per frame: measure elapsed time, run one [`GameState::tick`], hand queued
//! user actions to the controller, let the host draw, then sleep off whatever
//! is left of the frame. Overlong frames are not made up for.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::game_state::GameState;
use crate::persist::SaveError;
use crate::types::{GameAction, GameEvent, FRAME_MS};

/// Length of one frame
pub const FRAME: Duration = Duration::from_millis(FRAME_MS);

/// Input and output side of the loop
///
/// The host never decides game rules; it only forwards actions and draws.
pub trait FrameHost {
    /// Push actions collected since the previous frame
    fn poll_actions(&mut self, actions: &mut Vec<GameAction>);

    /// Draw the current state; `events` are the notifications raised this frame
    fn render(&mut self, game: &GameState, events: &[GameEvent]);

    /// Return false to leave the loop after the current frame
    fn keep_running(&mut self) -> bool;

    /// Where `Save` and `Load` go
    fn save_path(&self) -> &Path;

    /// A save or load failed; the game is unchanged
    fn report_error(&mut self, action: GameAction, err: &SaveError);
}

/// Wall-clock pacing for the loop
#[derive(Debug)]
pub struct FramePacer {
    frame: Duration,
    last_sample: Instant,
    frame_start: Instant,
}

impl FramePacer {
    pub fn new(frame: Duration) -> Self {
        let now = Instant::now();
        Self {
            frame,
            last_sample: now,
            frame_start: now,
        }
    }

    /// Mark the start of a frame; returns the time since the previous start
    pub fn begin_frame(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_sample);
        self.last_sample = now;
        self.frame_start = now;
        elapsed
    }

    /// Sleep for the rest of the frame, if any is left
    pub fn end_frame(&self) {
        if let Some(rest) = self.frame.checked_sub(self.frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(FRAME)
    }
}

/// Apply one action, handling `Save` and `Load` against `path`
///
/// Returns whether the action changed anything.
pub fn dispatch(game: &mut GameState, action: GameAction, path: &Path) -> Result<bool, SaveError> {
    match action {
        GameAction::Save => game.save(path).map(|()| true),
        GameAction::Load => game.load(path).map(|()| true),
        other => Ok(game.apply_action(other)),
    }
}

/// Run one frame with a given elapsed time
///
/// `actions` is scratch space reused across frames.
pub fn run_frame<H: FrameHost>(
    game: &mut GameState,
    host: &mut H,
    actions: &mut Vec<GameAction>,
    elapsed: Duration,
) {
    game.tick(elapsed);

    actions.clear();
    host.poll_actions(actions);
    for &action in actions.iter() {
        if let Err(err) = dispatch(game, action, host.save_path()) {
            host.report_error(action, &err);
        }
    }

    let events = game.take_events();
    host.render(game, &events);
}

/// Drive the game in real time until the host stops
pub fn run<H: FrameHost>(game: &mut GameState, host: &mut H, pacer: &mut FramePacer) {
    let mut actions = Vec::new();
    pacer.begin_frame();

    while host.keep_running() {
        let elapsed = pacer.begin_frame();
        run_frame(game, host, &mut actions, elapsed);
        pacer.end_frame();
    }
}
