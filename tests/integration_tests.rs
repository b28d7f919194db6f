//! Integration tests for the controller driven frame by frame

use std::time::Duration;

use tetris_rules::core::{ActivePiece, Board, GameState, SaveRecord};
use tetris_rules::types::{
    GameAction, GameEvent, Phase, PieceKind, RotateDir, Rotation, BOARD_WIDTH, FRAME_MS,
};

const FRAME: Duration = Duration::from_millis(FRAME_MS);
/// Frames per gravity cycle at the starting speed
const CYCLE_FRAMES: usize = 50;

/// Build a game in progress with a given board and active piece
fn playing_with(board: &Board, active: ActivePiece) -> GameState {
    let mut game = GameState::new(99);
    let mut record = SaveRecord::from_game(&game);
    record.cells = board.export_state();
    record.active = active;
    record.new_game = false;
    record.game_over = false;
    game.apply_record(&record).unwrap();
    game.take_events();
    game
}

fn piece(kind: PieceKind, rotation: Rotation, col: i8, row: i8) -> ActivePiece {
    ActivePiece {
        kind,
        rotation,
        col,
        row,
    }
}

/// Tick until the active piece locks; returns the frames it took
fn run_until_lock(game: &mut GameState, max_frames: usize) -> usize {
    for frame in 1..=max_frames {
        game.tick(FRAME);
        if game.take_events().contains(&GameEvent::PiecePlaced) {
            return frame;
        }
    }
    panic!("piece did not lock within {max_frames} frames");
}

#[test]
fn test_game_lifecycle() {
    let mut game = GameState::new(12345);
    assert_eq!(game.phase(), Phase::NewGame);

    assert!(game.apply_action(GameAction::Reset));
    assert_eq!(game.phase(), Phase::Playing);

    assert!(game.apply_action(GameAction::Pause));
    assert_eq!(game.phase(), Phase::Paused);
    for _ in 0..500 {
        assert!(!game.tick(FRAME));
    }

    assert!(game.apply_action(GameAction::Pause));
    assert_eq!(game.phase(), Phase::Playing);
}

#[test]
fn test_i_piece_falls_to_floor_without_clearing() {
    let mut game = playing_with(&Board::new(), piece(PieceKind::I, Rotation::North, 3, -1));

    // 21 rows of fall, then one more cycle to lock
    let frames = run_until_lock(&mut game, 30 * CYCLE_FRAMES);
    assert_eq!(frames, 22 * CYCLE_FRAMES);

    let board = game.board();
    for x in 0..BOARD_WIDTH as i8 {
        let expected = (3..7).contains(&x);
        assert_eq!(board.is_occupied(x, 21), expected, "column {x}");
    }
    assert_eq!(board.cells().iter().filter(|c| c.is_some()).count(), 4);

    let lock = game.take_last_lock().unwrap();
    assert_eq!(lock.lines_cleared, 0);
    assert_eq!(game.score(), 0);
}

#[test]
fn test_filling_last_gap_clears_row() {
    let mut board = Board::new();
    for x in 1..BOARD_WIDTH as i8 {
        board.set(x, 21, Some(PieceKind::O));
    }
    board.set(5, 20, Some(PieceKind::T));
    board.set(7, 17, Some(PieceKind::S));

    // Vertical I in column 0, bottom mino fills the gap
    let mut game = playing_with(&board, piece(PieceKind::I, Rotation::East, -2, 18));
    run_until_lock(&mut game, CYCLE_FRAMES);

    let lock = game.take_last_lock().unwrap();
    assert_eq!(lock.lines_cleared, 1);
    assert_eq!(lock.score_award, 100);
    assert_eq!(game.score(), 100);

    // Everything above the cleared row moved down by one
    let board = game.board();
    for y in 19..=21 {
        assert_eq!(board.get(0, y), Some(Some(PieceKind::I)), "row {y}");
    }
    assert_eq!(board.get(0, 18), Some(None));
    assert_eq!(board.get(5, 21), Some(Some(PieceKind::T)));
    assert_eq!(board.get(7, 18), Some(Some(PieceKind::S)));
    assert_eq!(board.get(1, 21), Some(None));
}

#[test]
fn test_four_lines_award_800() {
    let mut board = Board::new();
    for y in 18..22 {
        for x in 1..BOARD_WIDTH as i8 {
            board.set(x, y, Some(PieceKind::L));
        }
    }

    let mut game = playing_with(&board, piece(PieceKind::I, Rotation::East, -2, 18));
    run_until_lock(&mut game, CYCLE_FRAMES);

    assert_eq!(game.score(), 800);
    assert!(game.board().cells().iter().all(Option::is_none));
}

#[test]
fn test_overflowing_board_ends_game() {
    let mut board = Board::new();
    for x in 1..BOARD_WIDTH as i8 {
        board.set(x, 0, Some(PieceKind::Z));
    }

    let mut game = playing_with(&board, piece(PieceKind::O, Rotation::North, 0, 20));
    run_until_lock(&mut game, CYCLE_FRAMES);
    assert_eq!(game.phase(), Phase::GameOver);

    let frozen = game.board().clone();
    let active = game.active();
    for _ in 0..10 * CYCLE_FRAMES {
        assert!(!game.tick(FRAME));
    }
    assert_eq!(game.board(), &frozen);
    assert_eq!(game.active(), active);
    assert!(!game.apply_action(GameAction::MoveLeft));

    // Reset starts over on a clean board
    assert!(game.apply_action(GameAction::Reset));
    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(game.score(), 0);
    assert!(game.board().cells().iter().all(Option::is_none));
}

#[test]
fn test_four_rotations_restore_piece() {
    for kind in PieceKind::ALL {
        let start = piece(kind, Rotation::North, 4, 10);
        let mut game = playing_with(&Board::new(), start);

        for dir in [RotateDir::Cw, RotateDir::Ccw] {
            for _ in 0..4 {
                assert!(game.rotate(dir), "{kind:?}");
            }
            assert_eq!(game.active(), start, "{kind:?} {dir:?}");
        }
    }
}

#[test]
fn test_speed_rises_once_per_lock() {
    let mut game = playing_with(&Board::new(), piece(PieceKind::O, Rotation::North, 0, 20));
    run_until_lock(&mut game, CYCLE_FRAMES);

    assert!((game.speed() - 1.035).abs() < 1e-6);
    assert_eq!(game.level(), 1);
    // Set to 25 on lock, and the locking frame already counts one down
    assert_eq!(game.drop_cooldown(), 24);

    assert!(!game.apply_action(GameAction::SoftDropStart));
    for _ in 0..24 {
        game.tick(FRAME);
    }
    assert_eq!(game.drop_cooldown(), 0);
    assert!(game.apply_action(GameAction::SoftDropStart));
}

#[test]
fn test_soft_drop_then_release() {
    let mut game = playing_with(&Board::new(), piece(PieceKind::T, Rotation::North, 4, 0));

    assert!(game.apply_action(GameAction::SoftDropStart));
    // 25 cycles/s at 20ms frames: one row every other frame
    for _ in 0..10 {
        game.tick(FRAME);
    }
    assert_eq!(game.active().row, 5);

    game.apply_action(GameAction::SoftDropEnd);
    for _ in 0..CYCLE_FRAMES - 1 {
        game.tick(FRAME);
    }
    assert_eq!(game.active().row, 5);
    game.tick(FRAME);
    assert_eq!(game.active().row, 6);
}

#[test]
fn test_held_soft_drop_carries_over_to_next_piece() {
    let mut game = playing_with(&Board::new(), piece(PieceKind::O, Rotation::North, 0, 18));
    assert!(game.apply_action(GameAction::SoftDropStart));
    run_until_lock(&mut game, CYCLE_FRAMES);

    // The next piece falls at game speed during the cooldown
    let spawned = game.active().row;
    for _ in 0..24 {
        game.tick(FRAME);
    }
    assert_eq!(game.drop_cooldown(), 0);
    assert_eq!(game.active().row, spawned);

    // Still held, so the fast rate is back without a new press
    for _ in 0..10 {
        game.tick(FRAME);
    }
    assert!(game.active().row >= spawned + 5);

    // Released: a full cycle at the raised speed before the next step
    game.apply_action(GameAction::SoftDropEnd);
    let released = game.active().row;
    for _ in 0..40 {
        game.tick(FRAME);
    }
    assert_eq!(game.active().row, released);
}
