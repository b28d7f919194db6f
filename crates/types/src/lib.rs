//! Shared types and tuning constants.
//!
//! Plain data (serde-serializable where a host may want to log it), used by the
//! rules core, the command-line driver and any render/input shell.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 22 rows (indexed 0-21), of which rows 0-1 are hidden spawn
//!   rows above the 20 visible rows
//!
//! # Timing
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `FRAME_MS` | 20 | Frame length of the fixed-rate loop (50 frames/s) |
//! | `BASE_SPEED` | 1.0 | Gravity cycles per second at the start of a game |
//! | `SPEED_INCREMENT` | 0.035 | Speed added on every piece lock |
//! | `SOFT_DROP_RATE` | 25.0 | Gravity cycles per second while soft drop is held |
//! | `DROP_COOLDOWN_FRAMES` | 25 | Frames after a lock before soft drop is accepted |
//!
//! # Examples
//!
//! ```
//! use tetris_rules_types::{PieceKind, Rotation, BOARD_WIDTH, VISIBLE_ROWS};
//!
//! let piece = PieceKind::from_id(5).unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(piece.id(), 5);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(Rotation::from_index(3), Some(Rotation::West));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(VISIBLE_ROWS, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Rows visible to the player
pub const VISIBLE_ROWS: u8 = 20;

/// Rows above the visible area where pieces spawn and fall in
pub const HIDDEN_ROWS: u8 = 2;

/// Total board height in cells, hidden rows included
pub const BOARD_HEIGHT: u8 = VISIBLE_ROWS + HIDDEN_ROWS;

/// Frame length of the fixed-rate loop in milliseconds (50 frames/s)
pub const FRAME_MS: u64 = 20;

/// Game speed at the start of a new game (gravity cycles per second)
pub const BASE_SPEED: f32 = 1.0;

/// Speed added every time a piece locks, regardless of lines cleared
pub const SPEED_INCREMENT: f32 = 0.035;

/// Gravity rate while soft drop is held (cycles per second)
pub const SOFT_DROP_RATE: f32 = 25.0;

/// Frames after a lock during which soft drop is ignored (~0.5s)
pub const DROP_COOLDOWN_FRAMES: u32 = 25;

/// Displayed level is `floor(speed * LEVEL_FACTOR)`
pub const LEVEL_FACTOR: f32 = 1.70;

/// Level shown at the start of a new game
pub const START_LEVEL: u32 = 1;

/// Base of the line-clear award: `LINE_SCORE_BASE << lines`
pub const LINE_SCORE_BASE: u32 = 50;

/// Sentinel written for empty cells in exported grids and save files
pub const EMPTY_CELL_ID: i32 = -1;

/// Save file used when the shell does not pick one
pub const DEFAULT_SAVE_FILE: &str = "savegame.dat";


/// The seven piece kinds
///
/// Identifiers follow declaration order (I = 0 .. Z = 6) and double as the
/// cell value written to save files and the colour key for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// Every kind, in identifier order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Number of piece kinds in the catalog
    pub const COUNT: usize = 7;

    /// Numeric identifier (0..=6)
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Look up a kind by numeric identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use tetris_rules_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_id(0), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_id(9), None);
    /// ```
    pub fn from_id(id: i32) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }
}

/// Rotation states
///
/// - **North**: spawn orientation (index 0)
/// - **East**: 90° clockwise (index 1)
/// - **South**: 180° (index 2)
/// - **West**: 270° clockwise (index 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Rotation index 0-3
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rotation from index 0-3
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Rotation::North),
            1 => Some(Rotation::East),
            2 => Some(Rotation::South),
            3 => Some(Rotation::West),
            _ => None,
        }
    }
}

/// Direction of a rotate action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotateDir {
    Cw,
    Ccw,
}

impl RotateDir {
    pub fn apply(self, rotation: Rotation) -> Rotation {
        match self {
            RotateDir::Cw => rotation.rotate_cw(),
            RotateDir::Ccw => rotation.rotate_ccw(),
        }
    }
}

/// Discrete user actions forwarded by the shell
///
/// `Save` and `Load` touch the filesystem and are dispatched by the frame
/// loop, which owns the save path; everything else goes straight to the
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move piece one column left
    MoveLeft,
    /// Move piece one column right
    MoveRight,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Soft drop key pressed
    SoftDropStart,
    /// Soft drop key released
    SoftDropEnd,
    /// Toggle pause
    Pause,
    /// Start a new game (from the title or game-over screen)
    Reset,
    /// Write the session to the save file
    Save,
    /// Replace the session with the save file contents
    Load,
}

impl GameAction {
    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::SoftDropStart => "softDropStart",
            GameAction::SoftDropEnd => "softDropEnd",
            GameAction::Pause => "pause",
            GameAction::Reset => "reset",
            GameAction::Save => "save",
            GameAction::Load => "load",
        }
    }
}

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Nothing falling yet, waiting for a reset
    NewGame,
    Playing,
    Paused,
    /// Spawn was blocked; terminal until reset
    GameOver,
}

/// Notifications for the render/audio shell, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    GameStarted,
    Spawned(PieceKind),
    Rotated { clockwise: bool },
    /// A piece was written into the board
    PiecePlaced,
    LinesCleared(u32),
    PauseChanged(bool),
    GameOver,
    Loaded,
}

/// Summary of the most recent lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockEvent {
    pub lines_cleared: u32,
    pub score_award: u32,
    pub speed: f32,
}

/// A cell on the board
///
/// - `None`: empty
/// - `Some(PieceKind)`: filled with the given kind
pub type Cell = Option<PieceKind>;
