//! Pieces module - piece shapes, insets, spawn points and edge-corrected rotation
//!
//! Every kind lives in a square bounding box of `dimension` cells. Shapes are
//! listed as mino offsets from the box's top-left corner; insets count the
//! fully empty rows/columns on each side of the box for a rotation.

use crate::types::{PieceKind, RotateDir, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

/// Offset of a single mino relative to the bounding box origin
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from the bounding box origin
pub type PieceShape = [MinoOffset; 4];

/// Largest bounding box dimension in the catalog
pub const MAX_DIMENSION: usize = 4;

/// Occupancy mask, indexed `[row][column]`; only the top-left
/// `dimension x dimension` corner is meaningful.
pub type PieceMask = [[bool; MAX_DIMENSION]; MAX_DIMENSION];

/// Empty margins of a piece's bounding box at one rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Insets {
    pub left: i8,
    pub right: i8,
    pub top: i8,
    pub bottom: i8,
}

const ROTATIONS: [Rotation; 4] = [
    Rotation::North,
    Rotation::East,
    Rotation::South,
    Rotation::West,
];

/// Side length of the kind's square bounding box
pub const fn dimension(kind: PieceKind) -> i8 {
    match kind {
        PieceKind::I => 4,
        PieceKind::O => 2,
        _ => 3,
    }
}

/// Get the shape (mino offsets) for a piece kind and rotation
pub const fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    match kind {
        PieceKind::I => get_i_shape(rotation),
        PieceKind::J => get_j_shape(rotation),
        PieceKind::L => get_l_shape(rotation),
        PieceKind::O => get_o_shape(rotation),
        PieceKind::S => get_s_shape(rotation),
        PieceKind::T => get_t_shape(rotation),
        PieceKind::Z => get_z_shape(rotation),
    }
}

/// I piece shapes
const fn get_i_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        // N: horizontal on row 1
        Rotation::North => [(0, 1), (1, 1), (2, 1), (3, 1)],
        // E: vertical on column 2
        Rotation::East => [(2, 0), (2, 1), (2, 2), (2, 3)],
        // S: horizontal on row 2
        Rotation::South => [(0, 2), (1, 2), (2, 2), (3, 2)],
        // W: vertical on column 1
        Rotation::West => [(1, 0), (1, 1), (1, 2), (1, 3)],
    }
}

/// J piece shapes
const fn get_j_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 0), (0, 1), (1, 1), (2, 1)],
        Rotation::East => [(1, 0), (2, 0), (1, 1), (1, 2)],
        Rotation::South => [(0, 1), (1, 1), (2, 1), (2, 2)],
        Rotation::West => [(1, 0), (1, 1), (0, 2), (1, 2)],
    }
}

/// L piece shapes
const fn get_l_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(2, 0), (0, 1), (1, 1), (2, 1)],
        Rotation::East => [(1, 0), (1, 1), (1, 2), (2, 2)],
        Rotation::South => [(0, 1), (1, 1), (2, 1), (0, 2)],
        Rotation::West => [(0, 0), (1, 0), (1, 1), (1, 2)],
    }
}

/// O piece shapes (2x2 box, same for all rotations)
const fn get_o_shape(_rotation: Rotation) -> PieceShape {
    [(0, 0), (1, 0), (0, 1), (1, 1)]
}

/// S piece shapes
const fn get_s_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(1, 0), (2, 0), (0, 1), (1, 1)],
        Rotation::East => [(1, 0), (1, 1), (2, 1), (2, 2)],
        Rotation::South => [(1, 1), (2, 1), (0, 2), (1, 2)],
        Rotation::West => [(0, 0), (0, 1), (1, 1), (1, 2)],
    }
}

/// T piece shapes
const fn get_t_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(1, 0), (0, 1), (1, 1), (2, 1)],
        Rotation::East => [(1, 0), (1, 1), (2, 1), (1, 2)],
        Rotation::South => [(0, 1), (1, 1), (2, 1), (1, 2)],
        Rotation::West => [(1, 0), (0, 1), (1, 1), (1, 2)],
    }
}

/// Z piece shapes
const fn get_z_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 0), (1, 0), (1, 1), (2, 1)],
        Rotation::East => [(2, 0), (1, 1), (2, 1), (1, 2)],
        Rotation::South => [(0, 1), (1, 1), (1, 2), (2, 2)],
        Rotation::West => [(1, 0), (0, 1), (1, 1), (0, 2)],
    }
}

const fn compute_insets(shape: PieceShape, dim: i8) -> Insets {
    let mut min_x = dim;
    let mut max_x = -1;
    let mut min_y = dim;
    let mut max_y = -1;

    let mut i = 0;
    while i < shape.len() {
        let (x, y) = shape[i];
        if x < min_x {
            min_x = x;
        }
        if x > max_x {
            max_x = x;
        }
        if y < min_y {
            min_y = y;
        }
        if y > max_y {
            max_y = y;
        }
        i += 1;
    }

    Insets {
        left: min_x,
        right: dim - 1 - max_x,
        top: min_y,
        bottom: dim - 1 - max_y,
    }
}

const fn build_inset_table() -> [[Insets; 4]; PieceKind::COUNT] {
    let zero = Insets {
        left: 0,
        right: 0,
        top: 0,
        bottom: 0,
    };
    let mut table = [[zero; 4]; PieceKind::COUNT];

    let mut k = 0;
    while k < PieceKind::COUNT {
        let kind = PieceKind::ALL[k];
        let mut r = 0;
        while r < 4 {
            table[k][r] = compute_insets(get_shape(kind, ROTATIONS[r]), dimension(kind));
            r += 1;
        }
        k += 1;
    }

    table
}

static INSETS: [[Insets; 4]; PieceKind::COUNT] = build_inset_table();

/// Insets of a kind at a rotation
pub fn insets(kind: PieceKind, rotation: Rotation) -> Insets {
    INSETS[kind as usize][rotation.index()]
}

/// Occupancy mask for a kind at a rotation
pub fn mask(kind: PieceKind, rotation: Rotation) -> PieceMask {
    let mut out = [[false; MAX_DIMENSION]; MAX_DIMENSION];
    for (x, y) in get_shape(kind, rotation) {
        out[y as usize][x as usize] = true;
    }
    out
}

/// Whether the box cell `(x, y)` is occupied at a rotation
pub fn is_tile(kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> bool {
    get_shape(kind, rotation).contains(&(x, y))
}

/// Spawn column: the box is roughly centred on the 10-wide board
pub const fn spawn_column(kind: PieceKind) -> i8 {
    5 - dimension(kind) / 2
}

/// Spawn row: the topmost occupied row sits on grid row 0 (hidden area)
pub fn spawn_row(kind: PieceKind) -> i8 {
    -insets(kind, Rotation::North).top
}

/// Spawn position `(column, row)` for a new piece
pub fn spawn_position(kind: PieceKind) -> (i8, i8) {
    (spawn_column(kind), spawn_row(kind))
}

/// Shift a box position so the occupied part of `rotation` stays inside the
/// grid. Each axis moves by the minimum amount needed; positions already in
/// bounds are returned unchanged.
pub fn correct_into_bounds(kind: PieceKind, rotation: Rotation, col: i8, row: i8) -> (i8, i8) {
    let ins = insets(kind, rotation);
    let dim = dimension(kind);
    let width = BOARD_WIDTH as i8;
    let height = BOARD_HEIGHT as i8;

    let col = if col + ins.left < 0 {
        -ins.left
    } else if col + dim - ins.right > width {
        width - dim + ins.right
    } else {
        col
    };

    let row = if row + ins.top < 0 {
        -ins.top
    } else if row + dim - ins.bottom > height {
        height - dim + ins.bottom
    } else {
        row
    };

    (col, row)
}

/// Try to rotate a piece with edge correction
///
/// Returns `Some((new_rotation, col, row))` if the corrected position passes
/// `is_valid`, `None` otherwise.
pub fn try_rotate(
    kind: PieceKind,
    rotation: Rotation,
    col: i8,
    row: i8,
    dir: RotateDir,
    is_valid: impl FnOnce(Rotation, i8, i8) -> bool,
) -> Option<(Rotation, i8, i8)> {
    let new_rotation = dir.apply(rotation);
    let (new_col, new_row) = correct_into_bounds(kind, new_rotation, col, row);

    if is_valid(new_rotation, new_col, new_row) {
        Some((new_rotation, new_col, new_row))
    } else {
        None
    }
}
