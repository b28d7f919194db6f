//! Read-only view of a game for hosts that draw or log it

use serde::Serialize;

use crate::game_state::{ActivePiece, GameState};
use crate::types::{Cell, Phase, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Grid of cell codes: 0 = empty, otherwise piece id + 1
pub type SnapshotGrid = [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub board: SnapshotGrid,
    pub active: ActivePiece,
    pub next: PieceKind,
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub speed: f32,
    pub drop_cooldown: u32,
}

impl GameSnapshot {
    /// Board with the active piece drawn in, as a player would see it
    ///
    /// Minos outside the grid are skipped. The piece is not drawn on the title
    /// screen, where nothing is falling yet.
    pub fn composited_board(&self) -> SnapshotGrid {
        let mut grid = self.board;
        if self.phase == Phase::NewGame {
            return grid;
        }

        for (x, y) in self.active.cells() {
            if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
                if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
                    *cell = cell_code(Some(self.active.kind));
                }
            }
        }
        grid
    }
}

/// Encode a cell for [`SnapshotGrid`]
pub fn cell_code(cell: Cell) -> u8 {
    cell.map_or(0, |kind| kind.id() as u8 + 1)
}

impl GameState {
    /// Capture everything a renderer needs in one copyable value
    pub fn snapshot(&self) -> GameSnapshot {
        let mut board = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        for (dst, src) in board.iter_mut().zip(self.board.rows()) {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = cell_code(*s);
            }
        }

        GameSnapshot {
            board,
            active: self.active,
            next: self.next,
            phase: self.session.phase,
            score: self.session.score,
            level: self.session.level,
            speed: self.session.speed,
            drop_cooldown: self.session.drop_cooldown,
        }
    }
}
