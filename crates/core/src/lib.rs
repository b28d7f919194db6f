//! Core game logic - pure, deterministic, and testable
//!
//! Rules for a classic falling-block puzzle game. Nothing here reads input or
//! draws; a host feeds elapsed time and user actions in and reads state out.
//!
//! # Module Structure
//!
//! - [`board`]: 10x22 grid (20 visible rows, 2 hidden) with collision checks and line clearing
//! - [`pieces`]: the seven piece shapes, spawn positions and in-bounds rotation correction
//! - [`clock`]: gravity cycle accounting from caller-supplied elapsed time
//! - [`game_state`]: the controller state machine
//! - [`scoring`]: line-clear awards, speed increments, displayed level
//! - [`persist`]: binary save files, loaded all-or-nothing
//! - [`snapshot`]: copyable view for renderers
//! - [`frame`]: the fixed-rate frame loop and its host trait
//! - [`rng`]: seeded uniform piece picker
//!
//! # Game Rules
//!
//! - **Gravity**: one row per clock cycle; the clock starts at 1 cycle/s and
//!   speeds up by 0.035 on every lock
//! - **Scoring**: `50 << lines` for 1 to 4 lines cleared by one piece
//! - **Soft drop**: 25 cycles/s while held, refused for 25 frames after a lock
//! - **Rotation**: no kick table; a rotated piece that sticks out of the grid
//!   is shifted back in, and the rotation is dropped if it still collides
//! - **Randomizer**: uniform, one piece of preview
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tetris_rules_core::GameState;
//! use tetris_rules_types::{GameAction, Phase};
//!
//! let mut game = GameState::new(12345);
//! assert_eq!(game.phase(), Phase::NewGame);
//!
//! game.apply_action(GameAction::Reset);
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::RotateCw);
//!
//! // One second at 1 cycle/s moves the piece down one row.
//! let row = game.active().row;
//! for _ in 0..50 {
//!     game.tick(Duration::from_millis(20));
//! }
//! assert_eq!(game.active().row, row + 1);
//! ```
//!
//! # Timing
//!
//! The host calls [`GameState::tick`](game_state::GameState::tick) once per
//! 20ms frame with the time since the previous frame. At most one gravity step
//! runs per tick; leftover clock cycles are caught up on later frames.

pub mod board;
pub mod clock;
pub mod frame;
pub mod game_state;
pub mod persist;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use tetris_rules_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, GridError};
pub use clock::Clock;
pub use frame::{FrameHost, FramePacer};
pub use game_state::{ActivePiece, GameState, Session};
pub use persist::{SaveError, SaveRecord};
pub use pieces::{get_shape, try_rotate};
pub use rng::{PiecePicker, SimpleRng};
pub use scoring::line_clear_award;
pub use snapshot::GameSnapshot;
