//! Persist module - binary save file
//!
//! Fixed big-endian layout, one record per file:
//!
//! ```text
//! i32 level
//! i32 score
//! i32 column, i32 row, i32 rotation
//! i32 current piece id, i32 next piece id
//! f32 game speed
//! u8  game over, u8 new game
//! i32 row count, i32 column count
//! i32 cells[row count][column count]   row-major, -1 = empty
//! ```
//!
//! Loading reads and validates the whole file before the session is touched,
//! so a failed load leaves the game exactly as it was.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::board::{Board, GridError};
use crate::game_state::{ActivePiece, GameState, Session};
use crate::types::*;

/// Failure to save or load a game
#[derive(Debug)]
pub enum SaveError {
    Io(io::Error),
    /// File ended before `field` could be read
    Truncated { field: &'static str },
    /// Extra bytes after the last cell
    TrailingBytes(usize),
    Negative { field: &'static str, value: i32 },
    OutOfRange { field: &'static str, value: i32 },
    UnknownPiece(i32),
    BadRotation(i32),
    BadSpeed(f32),
    BoardShape { rows: i32, cols: i32 },
    Grid(GridError),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(err) => write!(f, "save file i/o failed: {err}"),
            SaveError::Truncated { field } => write!(f, "save file truncated at {field}"),
            SaveError::TrailingBytes(n) => write!(f, "{n} unexpected bytes after board"),
            SaveError::Negative { field, value } => write!(f, "{field} is negative ({value})"),
            SaveError::OutOfRange { field, value } => write!(f, "{field} out of range ({value})"),
            SaveError::UnknownPiece(id) => write!(f, "unknown piece id {id}"),
            SaveError::BadRotation(r) => write!(f, "rotation must be 0-3, got {r}"),
            SaveError::BadSpeed(s) => write!(f, "game speed must be positive, got {s}"),
            SaveError::BoardShape { rows, cols } => write!(
                f,
                "board must be {}x{}, got {rows}x{cols}",
                BOARD_HEIGHT, BOARD_WIDTH
            ),
            SaveError::Grid(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(err) => Some(err),
            SaveError::Grid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SaveError {
    fn from(err: io::Error) -> Self {
        SaveError::Io(err)
    }
}

impl From<GridError> for SaveError {
    fn from(err: GridError) -> Self {
        SaveError::Grid(err)
    }
}

/// Decoded save file contents
///
/// Scalar fields are range-checked by [`SaveRecord::decode`]; cell values are
/// checked when the record is turned into a board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRecord {
    pub level: u32,
    pub score: u32,
    pub active: ActivePiece,
    pub next: PieceKind,
    pub speed: f32,
    pub game_over: bool,
    pub new_game: bool,
    pub cells: Vec<Vec<i32>>,
}

impl SaveRecord {
    /// Capture a game
    pub fn from_game(game: &GameState) -> Self {
        Self {
            level: game.session.level,
            score: game.session.score,
            active: game.active,
            next: game.next,
            speed: game.session.speed,
            game_over: game.session.is_game_over(),
            new_game: game.session.is_new_game(),
            cells: game.board.export_state(),
        }
    }

    /// Validate the cell grid into a board
    pub fn board(&self) -> Result<Board, SaveError> {
        Ok(Board::from_state(&self.cells)?)
    }

    /// Serialize to the save file layout
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rows = self.cells.len();
        let cols = self.cells.first().map_or(0, Vec::len);

        write_i32(out, clamp_i32(self.level))?;
        write_i32(out, clamp_i32(self.score))?;
        write_i32(out, self.active.col.into())?;
        write_i32(out, self.active.row.into())?;
        write_i32(out, self.active.rotation.index() as i32)?;
        write_i32(out, self.active.kind.id())?;
        write_i32(out, self.next.id())?;
        out.write_all(&self.speed.to_be_bytes())?;
        out.write_all(&[self.game_over as u8, self.new_game as u8])?;
        write_i32(out, rows as i32)?;
        write_i32(out, cols as i32)?;
        for row in &self.cells {
            for &cell in row {
                write_i32(out, cell)?;
            }
        }
        Ok(())
    }

    /// Serialize to a byte vector
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(encoded_len(self.cells.len(), BOARD_WIDTH as usize));
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    /// Parse and range-check a complete save file
    pub fn decode(bytes: &[u8]) -> Result<Self, SaveError> {
        let mut r = Reader::new(bytes);

        let level = non_negative("level", r.i32("level")?)?;
        let score = non_negative("score", r.i32("score")?)?;
        let col = coordinate("column", r.i32("column")?)?;
        let row = coordinate("row", r.i32("row")?)?;
        let rotation_raw = r.i32("rotation")?;
        let rotation = usize::try_from(rotation_raw)
            .ok()
            .and_then(Rotation::from_index)
            .ok_or(SaveError::BadRotation(rotation_raw))?;
        let kind = piece(r.i32("current piece")?)?;
        let next = piece(r.i32("next piece")?)?;

        let speed = r.f32("game speed")?;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(SaveError::BadSpeed(speed));
        }

        let game_over = r.bool("game over flag")?;
        let new_game = r.bool("new game flag")?;

        let rows = r.i32("row count")?;
        let cols = r.i32("column count")?;
        if rows != BOARD_HEIGHT as i32 || cols != BOARD_WIDTH as i32 {
            return Err(SaveError::BoardShape { rows, cols });
        }

        let mut cells = Vec::with_capacity(rows as usize);
        for _ in 0..rows {
            let mut line = Vec::with_capacity(cols as usize);
            for _ in 0..cols {
                line.push(r.i32("board cell")?);
            }
            cells.push(line);
        }

        if r.remaining() > 0 {
            return Err(SaveError::TrailingBytes(r.remaining()));
        }

        Ok(Self {
            level,
            score,
            active: ActivePiece {
                kind,
                rotation,
                col,
                row,
            },
            next,
            speed,
            game_over,
            new_game,
            cells,
        })
    }
}

/// Size in bytes of a record with the given grid shape
pub fn encoded_len(rows: usize, cols: usize) -> usize {
    // 7 header ints, 1 float, 2 flag bytes, 2 shape ints, then the cells
    7 * 4 + 4 + 2 + 2 * 4 + rows * cols * 4
}

/// Read and decode a save file without touching any game
pub fn read_record(path: &Path) -> Result<SaveRecord, SaveError> {
    let bytes = fs::read(path)?;
    SaveRecord::decode(&bytes)
}

/// Write a record next to `path` and move it into place
///
/// The previous file survives if any step fails.
pub fn write_record(path: &Path, record: &SaveRecord) -> Result<(), SaveError> {
    let tmp = temp_path(path);
    let result = write_file(&tmp, record).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    Ok(result?)
}

fn write_file(path: &Path, record: &SaveRecord) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    record.write_to(&mut out)?;
    out.flush()?;
    out.get_ref().sync_all()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

impl GameState {
    /// Write the session to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        write_record(path.as_ref(), &SaveRecord::from_game(self))
    }

    /// Replace the session with the contents of `path`
    ///
    /// All-or-nothing: on error nothing changes.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let record = read_record(path.as_ref())?;
        self.apply_record(&record)
    }

    /// Replace the session with a decoded record
    ///
    /// The board is validated before any field is written.
    pub fn apply_record(&mut self, record: &SaveRecord) -> Result<(), SaveError> {
        let board = record.board()?;

        let phase = if record.game_over {
            Phase::GameOver
        } else if record.new_game {
            Phase::NewGame
        } else if self.session.is_paused() {
            Phase::Paused
        } else {
            Phase::Playing
        };

        self.board = board;
        self.active = record.active;
        self.next = record.next;
        self.session = Session {
            score: record.score,
            level: record.level,
            speed: record.speed,
            phase,
            drop_cooldown: 0,
            soft_drop_held: false,
        };
        self.last_lock = None;

        self.clock.reset();
        self.clock.set_rate(record.speed);
        self.clock.set_paused(phase != Phase::Playing);

        self.emit(GameEvent::Loaded);
        Ok(())
    }
}

fn write_i32<W: Write>(out: &mut W, value: i32) -> io::Result<()> {
    out.write_all(&value.to_be_bytes())
}

fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn non_negative(field: &'static str, value: i32) -> Result<u32, SaveError> {
    u32::try_from(value).map_err(|_| SaveError::Negative { field, value })
}

fn coordinate(field: &'static str, value: i32) -> Result<i8, SaveError> {
    i8::try_from(value).map_err(|_| SaveError::OutOfRange { field, value })
}

fn piece(id: i32) -> Result<PieceKind, SaveError> {
    PieceKind::from_id(id).ok_or(SaveError::UnknownPiece(id))
}

/// Cursor over a big-endian byte buffer
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], SaveError> {
        let end = self.pos + N;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or(SaveError::Truncated { field })?;
        self.pos = end;

        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    fn i32(&mut self, field: &'static str) -> Result<i32, SaveError> {
        self.take::<4>(field).map(i32::from_be_bytes)
    }

    fn f32(&mut self, field: &'static str) -> Result<f32, SaveError> {
        self.take::<4>(field).map(f32::from_be_bytes)
    }

    fn bool(&mut self, field: &'static str) -> Result<bool, SaveError> {
        self.take::<1>(field).map(|[b]| b != 0)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}
