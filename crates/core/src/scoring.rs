//! Scoring module - line-clear awards and speed-derived level
//!
//! One lock event awards `50 << lines` points:
//!
//! | Lines | Points |
//! |-------|--------|
//! | 0 | 0 |
//! | 1 | 100 |
//! | 2 | 200 |
//! | 3 | 400 |
//! | 4 | 800 |
//!
//! Speed grows by a fixed step per lock; the level shown to the player is a
//! plain function of speed and has no effect on play.

use crate::types::{LEVEL_FACTOR, LINE_SCORE_BASE, SPEED_INCREMENT};

/// Points for clearing `lines` rows with one piece
pub fn line_clear_award(lines: u32) -> u32 {
    match lines {
        1..=4 => LINE_SCORE_BASE << lines,
        _ => 0,
    }
}

/// Game speed after one more lock
pub fn next_speed(speed: f32) -> f32 {
    speed + SPEED_INCREMENT
}

/// Displayed level for a game speed (`floor(speed * 1.70)`)
pub fn level_for_speed(speed: f32) -> u32 {
    // `as` saturates: negative and NaN speeds map to 0.
    (speed * LEVEL_FACTOR) as u32
}
