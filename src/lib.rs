//! Falling-block puzzle rules engine (workspace facade crate).
//!
//! Re-exports `tetris_rules::{core,types}`; the implementation lives in the
//! crates under `crates/`.

pub use tetris_rules_core as core;
pub use tetris_rules_types as types;
