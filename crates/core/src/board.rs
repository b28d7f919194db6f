//! Board module - manages the game grid
//!
//! The board is a 10x22 grid where each cell can be empty or filled with a piece kind.
//! Rows 0-1 are hidden spawn rows above the 20 visible rows.
//! Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..21 (top to bottom)

use std::fmt;

use arrayvec::ArrayVec;

use crate::pieces::get_shape;
use crate::types::{Cell, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH, EMPTY_CELL_ID};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

const ROWS: usize = BOARD_HEIGHT as usize;

/// Row indices removed by one collapse, bottom to top
pub type ClearedRows = ArrayVec<usize, ROWS>;

/// Rejected grid passed to [`Board::import_state`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    Shape { rows: usize, cols: usize },
    BadCell { row: usize, col: usize, value: i32 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Shape { rows, cols } => write!(
                f,
                "board must be {}x{}, got {rows}x{cols}",
                BOARD_HEIGHT, BOARD_WIDTH
            ),
            GridError::BadCell { row, col, value } => {
                write!(f, "invalid cell value {value} at row {row}, column {col}")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// The game board - 10 columns x 22 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    /// Get width of the board
    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    /// Get height of the board (hidden rows included)
    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is valid (within bounds and empty)
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check whether a piece fits at a box position: every occupied mino must
    /// land inside the grid on an empty cell.
    pub fn is_valid_and_empty(&self, kind: PieceKind, col: i8, row: i8, rotation: Rotation) -> bool {
        get_shape(kind, rotation).iter().all(|&(dx, dy)| {
            match (col.checked_add(dx), row.checked_add(dy)) {
                (Some(x), Some(y)) => self.is_valid(x, y),
                _ => false,
            }
        })
    }

    /// Write a piece into the grid
    ///
    /// Does not validate; call [`Board::is_valid_and_empty`] first. Minos
    /// outside the grid are dropped.
    pub fn add_piece(&mut self, kind: PieceKind, col: i8, row: i8, rotation: Rotation) {
        for (dx, dy) in get_shape(kind, rotation) {
            if let (Some(x), Some(y)) = (col.checked_add(dx), row.checked_add(dy)) {
                self.set(x, y, Some(kind));
            }
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= ROWS {
            return false;
        }
        let start = y * BOARD_WIDTH as usize;
        let end = start + BOARD_WIDTH as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Clear all full rows and return the row indices that were cleared (sorted bottom to top)
    ///
    /// Two-pointer collapse: each surviving row moves down by the number of
    /// full rows below it, so non-contiguous clears shift correctly.
    pub fn clear_full_rows(&mut self) -> ClearedRows {
        let mut cleared_rows = ClearedRows::new();
        let width = BOARD_WIDTH as usize;
        let mut write_y = ROWS;

        // Scan from bottom to top
        for read_y in (0..ROWS).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * width;
                    let dst_start = write_y * width;
                    self.cells
                        .copy_within(src_start..src_start + width, dst_start);
                }
            }
        }

        // Clear the exposed rows at the top
        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }

        cleared_rows
    }

    /// Remove every full row and return how many were removed
    pub fn check_lines(&mut self) -> u32 {
        self.clear_full_rows().len() as u32
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(BOARD_WIDTH as usize)
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Export the grid row-major as piece ids, [`EMPTY_CELL_ID`] for empty cells
    pub fn export_state(&self) -> Vec<Vec<i32>> {
        self.rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or(EMPTY_CELL_ID, PieceKind::id))
                    .collect()
            })
            .collect()
    }

    /// Decode an exported grid without touching any board
    pub fn from_state(grid: &[Vec<i32>]) -> Result<Self, GridError> {
        let cols = grid.first().map_or(0, Vec::len);
        if grid.len() != ROWS || grid.iter().any(|row| row.len() != BOARD_WIDTH as usize) {
            return Err(GridError::Shape {
                rows: grid.len(),
                cols,
            });
        }

        let mut board = Self::new();
        for (y, row) in grid.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                let cell = if value == EMPTY_CELL_ID {
                    None
                } else {
                    let kind = PieceKind::from_id(value).ok_or(GridError::BadCell {
                        row: y,
                        col: x,
                        value,
                    })?;
                    Some(kind)
                };
                board.cells[y * BOARD_WIDTH as usize + x] = cell;
            }
        }
        Ok(board)
    }

    /// Overwrite the whole grid from an exported one
    ///
    /// The grid is validated first; on error the board is left untouched.
    pub fn import_state(&mut self, grid: &[Vec<i32>]) -> Result<(), GridError> {
        *self = Self::from_state(grid)?;
        Ok(())
    }

    /// Create from a 2D vector for testing (converts to flat array)
    #[cfg(test)]
    pub fn from_cells(cells_2d: Vec<Vec<Cell>>) -> Self {
        assert_eq!(cells_2d.len(), ROWS);
        assert!(cells_2d.iter().all(|row| row.len() == BOARD_WIDTH as usize));

        let mut flat = [None; BOARD_SIZE];
        for (y, row) in cells_2d.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                flat[y * BOARD_WIDTH as usize + x] = *cell;
            }
        }
        Self { cells: flat }
    }

    /// Convert to 2D vector for testing/display
    #[cfg(test)]
    pub fn to_cells(&self) -> Vec<Vec<Cell>> {
        self.rows().map(<[Cell]>::to_vec).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
