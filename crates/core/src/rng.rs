//! RNG module - uniform random piece selection
//!
//! Each draw picks one of the seven kinds with equal probability, independent
//! of previous draws. The generator is a small LCG so games replay exactly
//! from a seed.

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of an LCG with a power-of-two modulus
    /// cycle with a short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }
}

/// Uniform piece generator
#[derive(Debug, Clone)]
pub struct PiecePicker {
    rng: SimpleRng,
}

impl PiecePicker {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Draw the next piece kind
    pub fn draw(&mut self) -> PieceKind {
        let idx = self.rng.next_range(PieceKind::COUNT as u32) as usize;
        PieceKind::ALL[idx]
    }
}

impl Default for PiecePicker {
    fn default() -> Self {
        Self::new(1)
    }
}
