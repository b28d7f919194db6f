//! Save file tests - round trips through real files and failed loads

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tetris_rules::core::persist::{encoded_len, read_record};
use tetris_rules::core::{GameState, SaveError, SaveRecord};
use tetris_rules::types::{GameAction, GameEvent, Phase, FRAME_MS};

fn temp_file(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("tetris-rules-{}-{name}", std::process::id()));
    path
}

/// A game a few pieces in, so score, speed and board are all non-default
fn game_in_progress(seed: u32) -> GameState {
    let mut game = GameState::new(seed);
    game.reset();
    let frame = Duration::from_millis(FRAME_MS);
    let mut locks = 0;
    while locks < 3 && !game.is_game_over() {
        game.apply_action(GameAction::MoveLeft);
        game.tick(frame);
        locks += game
            .take_events()
            .iter()
            .filter(|e| **e == GameEvent::PiecePlaced)
            .count();
    }
    game
}

#[test]
fn test_save_load_round_trip() {
    let path = temp_file("roundtrip.dat");
    let source = game_in_progress(77);
    source.save(&path).unwrap();

    assert_eq!(
        fs::metadata(&path).unwrap().len() as usize,
        encoded_len(22, 10)
    );

    let mut target = GameState::new(1);
    target.load(&path).unwrap();

    assert_eq!(target.score(), source.score());
    assert_eq!(target.level(), source.level());
    assert_eq!(target.speed(), source.speed());
    assert_eq!(target.active(), source.active());
    assert_eq!(target.next_piece(), source.next_piece());
    assert_eq!(target.board(), source.board());
    assert_eq!(target.phase(), source.phase());
    assert!(target.take_events().contains(&GameEvent::Loaded));

    let _ = fs::remove_file(&path);
}

#[test]
fn test_save_replaces_previous_file() {
    let path = temp_file("replace.dat");
    GameState::new(3).save(&path).unwrap();
    let later = game_in_progress(3);
    later.save(&path).unwrap();

    let record = read_record(&path).unwrap();
    assert_eq!(record, SaveRecord::from_game(&later));

    let mut tmp = path.clone().into_os_string();
    tmp.push(".tmp");
    assert!(!PathBuf::from(tmp).exists());

    let _ = fs::remove_file(&path);
}

#[test]
fn test_title_screen_save_loads_as_new_game() {
    let path = temp_file("title.dat");
    GameState::new(5).save(&path).unwrap();

    let mut game = game_in_progress(8);
    game.load(&path).unwrap();
    assert_eq!(game.phase(), Phase::NewGame);
    assert!(game.board().cells().iter().all(Option::is_none));

    // Nothing falls until the game is started
    assert!(!game.tick(Duration::from_secs(5)));
    assert!(game.apply_action(GameAction::Reset));

    let _ = fs::remove_file(&path);
}

#[test]
fn test_missing_file_leaves_state_unchanged() {
    let mut game = game_in_progress(12);
    let before = SaveRecord::from_game(&game);

    let err = game.load(temp_file("does-not-exist.dat")).unwrap_err();
    assert!(matches!(err, SaveError::Io(_)));
    assert_eq!(SaveRecord::from_game(&game), before);
}

#[test]
fn test_truncated_file_leaves_state_unchanged() {
    let path = temp_file("truncated.dat");
    let bytes = SaveRecord::from_game(&game_in_progress(21)).encode();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let mut game = game_in_progress(22);
    let before = SaveRecord::from_game(&game);

    let err = game.load(&path).unwrap_err();
    assert!(matches!(err, SaveError::Truncated { .. }));
    assert_eq!(SaveRecord::from_game(&game), before);
    assert!(!game.take_events().contains(&GameEvent::Loaded));

    let _ = fs::remove_file(&path);
}

#[test]
fn test_corrupt_cell_leaves_state_unchanged() {
    let path = temp_file("corrupt.dat");
    let mut bytes = SaveRecord::from_game(&game_in_progress(31)).encode();
    // Last cell of the grid
    let at = bytes.len() - 4;
    bytes[at..].copy_from_slice(&42i32.to_be_bytes());
    fs::write(&path, &bytes).unwrap();

    let mut game = game_in_progress(32);
    let before = SaveRecord::from_game(&game);

    let err = game.load(&path).unwrap_err();
    assert!(matches!(err, SaveError::Grid(_)));
    assert!(err.to_string().contains("42"));
    assert_eq!(SaveRecord::from_game(&game), before);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_save_to_missing_directory_fails() {
    let mut path = temp_file("no-such-dir");
    path.push("save.dat");

    let err = GameState::new(1).save(&path).unwrap_err();
    assert!(matches!(err, SaveError::Io(_)));
    assert!(!path.exists());
}

#[test]
fn test_load_while_paused_keeps_game_paused() {
    let path = temp_file("paused.dat");
    game_in_progress(41).save(&path).unwrap();

    let mut game = game_in_progress(42);
    assert!(game.apply_action(GameAction::Pause));
    game.load(&path).unwrap();
    assert_eq!(game.phase(), Phase::Paused);

    let before = game.active();
    for _ in 0..500 {
        assert!(!game.tick(Duration::from_millis(FRAME_MS)));
    }
    assert_eq!(game.active(), before);

    assert!(game.apply_action(GameAction::Pause));
    assert_eq!(game.phase(), Phase::Playing);

    let _ = fs::remove_file(&path);
}
