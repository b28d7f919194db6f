use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetris_rules::core::{Board, GameState, SaveRecord};
use tetris_rules::types::{PieceKind, RotateDir, FRAME_MS};

fn bench_tick(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.reset();
    let frame = Duration::from_millis(FRAME_MS);

    c.bench_function("game_tick_20ms", |b| {
        b.iter(|| {
            if state.is_game_over() {
                state.reset();
            }
            state.tick(black_box(frame));
            state.take_events();
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::new();
            for y in 18..22 {
                for x in 0..10 {
                    board.set(x, y, Some(PieceKind::I));
                }
            }
            black_box(board.check_lines());
        })
    });
}

fn bench_move(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.reset();

    c.bench_function("move_left_right", |b| {
        b.iter(|| {
            state.move_left();
            state.move_right();
        })
    });
}

fn bench_rotate(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.reset();

    c.bench_function("rotate", |b| {
        b.iter(|| {
            state.rotate(black_box(RotateDir::Cw));
        })
    });
}

fn bench_save_codec(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.reset();
    let record = SaveRecord::from_game(&state);
    let bytes = record.encode();

    c.bench_function("save_encode", |b| b.iter(|| black_box(record.encode())));
    c.bench_function("save_decode", |b| {
        b.iter(|| SaveRecord::decode(black_box(&bytes)))
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_line_clear,
    bench_move,
    bench_rotate,
    bench_save_codec
);
criterion_main!(benches);
