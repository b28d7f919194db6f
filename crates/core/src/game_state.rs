//! Game state module - the controller
//!
//! Ties together board, pieces, RNG, clock and scoring. A session moves
//! through `NewGame -> Playing <-> Paused -> GameOver`, and back to `Playing`
//! through [`GameState::reset`].
//!
//! Every frame the host calls [`GameState::tick`] with the time since the
//! previous frame, forwards user actions between frames, and reads the
//! accessors to draw.

use std::time::Duration;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::pieces::{get_shape, spawn_position, try_rotate, PieceShape};
use crate::rng::PiecePicker;
use crate::scoring::{level_for_speed, line_clear_award, next_speed};
use crate::types::*;
use crate::Board;

/// Events kept between drains; once full, each new event evicts the oldest.
pub const EVENT_CAPACITY: usize = 32;

/// Queue of notifications for the host
pub type EventQueue = ArrayVec<GameEvent, EVENT_CAPACITY>;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub col: i8,
    pub row: i8,
}

impl ActivePiece {
    /// Create a piece at its catalog spawn position
    pub fn spawn(kind: PieceKind) -> Self {
        let (col, row) = spawn_position(kind);
        Self {
            kind,
            rotation: Rotation::North,
            col,
            row,
        }
    }

    /// Get the shape (mino offsets) for current rotation
    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    /// Check if the piece fits on the board where it is
    pub fn is_valid(&self, board: &Board) -> bool {
        board.is_valid_and_empty(self.kind, self.col, self.row, self.rotation)
    }

    /// Absolute grid cells covered by the piece
    pub fn cells(&self) -> [(i8, i8); 4] {
        self.shape()
            .map(|(dx, dy)| (self.col.saturating_add(dx), self.row.saturating_add(dy)))
    }
}

/// Score, level, speed and lifecycle of one game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub score: u32,
    pub level: u32,
    /// Gravity cycles per second
    pub speed: f32,
    pub phase: Phase,
    /// Frames left before soft drop is accepted again
    pub drop_cooldown: u32,
    /// Soft drop is held down; the fast rate comes back when the cooldown ends
    pub soft_drop_held: bool,
}

impl Session {
    /// State before the first game starts
    pub fn title() -> Self {
        Self {
            phase: Phase::NewGame,
            ..Self::fresh()
        }
    }

    /// State at the start of a new game
    pub fn fresh() -> Self {
        Self {
            score: 0,
            level: START_LEVEL,
            speed: BASE_SPEED,
            phase: Phase::Playing,
            drop_cooldown: 0,
            soft_drop_held: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_new_game(&self) -> bool {
        self.phase == Phase::NewGame
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::title()
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) active: ActivePiece,
    pub(crate) next: PieceKind,
    pub(crate) picker: PiecePicker,
    pub(crate) clock: Clock,
    pub(crate) session: Session,
    pub(crate) events: EventQueue,
    pub(crate) last_lock: Option<LockEvent>,
}

impl GameState {
    /// Create a session on the title screen with the given RNG seed
    ///
    /// Nothing falls until [`GameState::reset`] starts the first game.
    pub fn new(seed: u32) -> Self {
        let mut picker = PiecePicker::new(seed);
        let active = ActivePiece::spawn(picker.draw());
        let next = picker.draw();

        let mut clock = Clock::new(BASE_SPEED);
        clock.set_paused(true);

        Self {
            board: Board::new(),
            active,
            next,
            picker,
            clock,
            session: Session::title(),
            events: EventQueue::new(),
            last_lock: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> ActivePiece {
        self.active
    }

    pub fn next_piece(&self) -> PieceKind {
        self.next
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn level(&self) -> u32 {
        self.session.level
    }

    pub fn speed(&self) -> f32 {
        self.session.speed
    }

    pub fn drop_cooldown(&self) -> u32 {
        self.session.drop_cooldown
    }

    pub fn is_paused(&self) -> bool {
        self.session.is_paused()
    }

    pub fn is_new_game(&self) -> bool {
        self.session.is_new_game()
    }

    pub fn is_game_over(&self) -> bool {
        self.session.is_game_over()
    }

    /// Queue an event, dropping the oldest one when the queue is full
    pub(crate) fn emit(&mut self, event: GameEvent) {
        if self.events.is_full() {
            self.events.remove(0);
        }
        let _ = self.events.try_push(event);
    }

    /// Take every event queued since the last call
    pub fn take_events(&mut self) -> EventQueue {
        std::mem::take(&mut self.events)
    }

    /// Take and clear the summary of the most recent lock
    pub fn take_last_lock(&mut self) -> Option<LockEvent> {
        self.last_lock.take()
    }

    /// Start a new game
    ///
    /// Only allowed from the title screen or after game over; returns false
    /// otherwise.
    pub fn reset(&mut self) -> bool {
        if !matches!(self.session.phase, Phase::NewGame | Phase::GameOver) {
            return false;
        }

        self.session = Session::fresh();
        self.board.clear();
        self.last_lock = None;

        self.clock.reset();
        self.clock.set_rate(self.session.speed);
        self.clock.set_paused(false);

        self.emit(GameEvent::GameStarted);
        self.spawn_piece();
        true
    }

    /// Promote the queued piece and draw a new one
    ///
    /// A blocked spawn ends the game and freezes the clock. Returns whether
    /// the spawn position was free.
    pub fn spawn_piece(&mut self) -> bool {
        self.active = ActivePiece::spawn(self.next);
        self.next = self.picker.draw();
        self.emit(GameEvent::Spawned(self.active.kind));

        if !self.active.is_valid(&self.board) {
            self.session.phase = Phase::GameOver;
            self.clock.set_paused(true);
            self.emit(GameEvent::GameOver);
            return false;
        }

        true
    }

    /// Main game tick - advance the clock and apply at most one gravity step
    ///
    /// Returns true if gravity ran this frame.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.clock.update(elapsed);

        let stepped = self.clock.has_elapsed_cycle() && self.session.phase == Phase::Playing;
        if stepped {
            self.step_gravity();
        }

        if self.session.drop_cooldown > 0 {
            self.session.drop_cooldown -= 1;
            if self.session.drop_cooldown == 0 {
                self.resume_held_soft_drop();
            }
        }

        stepped
    }

    /// Move the piece down one row, or lock it if it cannot fall
    pub fn step_gravity(&mut self) {
        if !self.try_move(0, 1) {
            self.lock_piece();
        }
    }

    /// Lock the active piece onto the board, clear lines, speed up and respawn
    pub fn lock_piece(&mut self) {
        let piece = self.active;
        self.board
            .add_piece(piece.kind, piece.col, piece.row, piece.rotation);
        self.emit(GameEvent::PiecePlaced);

        let lines_cleared = self.board.check_lines();
        let score_award = line_clear_award(lines_cleared);
        if lines_cleared > 0 {
            self.session.score = self.session.score.saturating_add(score_award);
            self.emit(GameEvent::LinesCleared(lines_cleared));
        }

        self.session.speed = next_speed(self.session.speed);
        self.clock.set_rate(self.session.speed);
        self.clock.reset();
        self.session.drop_cooldown = DROP_COOLDOWN_FRAMES;
        self.session.level = level_for_speed(self.session.speed);

        self.last_lock = Some(LockEvent {
            lines_cleared,
            score_award,
            speed: self.session.speed,
        });

        self.spawn_piece();
    }

    /// Try to move the active piece
    pub(crate) fn try_move(&mut self, dx: i8, dy: i8) -> bool {
        let piece = self.active;
        let (Some(col), Some(row)) = (piece.col.checked_add(dx), piece.row.checked_add(dy)) else {
            return false;
        };

        if self
            .board
            .is_valid_and_empty(piece.kind, col, row, piece.rotation)
        {
            self.active = ActivePiece { col, row, ..piece };
            return true;
        }

        false
    }

    pub fn move_left(&mut self) -> bool {
        self.session.phase == Phase::Playing && self.try_move(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.session.phase == Phase::Playing && self.try_move(1, 0)
    }

    /// Rotate the active piece, shifting it back inside the walls if needed
    ///
    /// A blocked rotation leaves the piece untouched.
    pub fn rotate(&mut self, dir: RotateDir) -> bool {
        if self.session.phase != Phase::Playing {
            return false;
        }

        let piece = self.active;
        let board = &self.board;
        let result = try_rotate(
            piece.kind,
            piece.rotation,
            piece.col,
            piece.row,
            dir,
            |rotation, col, row| board.is_valid_and_empty(piece.kind, col, row, rotation),
        );

        match result {
            Some((rotation, col, row)) => {
                self.active = ActivePiece {
                    rotation,
                    col,
                    row,
                    ..piece
                };
                self.emit(GameEvent::Rotated {
                    clockwise: dir == RotateDir::Cw,
                });
                true
            }
            None => false,
        }
    }

    /// Soft drop pressed: run gravity at the fixed fast rate while held
    ///
    /// Returns true if the fast rate took effect now. During the post-lock
    /// cooldown the press is remembered and the fast rate starts once the
    /// cooldown runs out. Ignored outside play.
    pub fn soft_drop_start(&mut self) -> bool {
        if self.session.phase != Phase::Playing {
            return false;
        }
        self.session.soft_drop_held = true;
        if self.session.drop_cooldown > 0 {
            return false;
        }
        self.clock.set_rate(SOFT_DROP_RATE);
        true
    }

    /// Soft drop released: back to game speed with a fresh cycle
    pub fn soft_drop_end(&mut self) {
        self.session.soft_drop_held = false;
        self.clock.set_rate(self.session.speed);
        self.clock.reset();
    }

    fn resume_held_soft_drop(&mut self) {
        if self.session.soft_drop_held
            && self.session.drop_cooldown == 0
            && self.session.phase == Phase::Playing
        {
            self.clock.set_rate(SOFT_DROP_RATE);
        }
    }

    /// Toggle pause; unavailable on the title screen and after game over
    pub fn toggle_pause(&mut self) -> bool {
        let paused = match self.session.phase {
            Phase::Playing => true,
            Phase::Paused => false,
            Phase::NewGame | Phase::GameOver => return false,
        };

        self.session.phase = if paused {
            Phase::Paused
        } else {
            Phase::Playing
        };
        self.clock.set_paused(paused);
        if !paused {
            self.resume_held_soft_drop();
        }
        self.emit(GameEvent::PauseChanged(paused));
        true
    }

    /// Apply a game action
    ///
    /// `Save` and `Load` need a file path and are left to the caller; they
    /// return false here.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::RotateCw => self.rotate(RotateDir::Cw),
            GameAction::RotateCcw => self.rotate(RotateDir::Ccw),
            GameAction::SoftDropStart => self.soft_drop_start(),
            GameAction::SoftDropEnd => {
                self.soft_drop_end();
                true
            }
            GameAction::Pause => self.toggle_pause(),
            GameAction::Reset => self.reset(),
            GameAction::Save | GameAction::Load => false,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}
