//! RNG module - the local seeded generator
//!
//! A small LCG (Linear Congruential Generator) that backs the local integer
//! source. It is deterministic for a given seed, which makes recorded games and
//! tests reproducible.

use crate::types::PieceId;

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
    /// Scales the high 16 bits; the low bits of a power-of-two LCG have short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        let high = self.next_u32() >> 16;
        ((u64::from(high) * u64::from(max)) >> 16) as u32
    }

    /// Draw a value in the inclusive range `[lo, hi]`.
    ///
    /// Callers guarantee `lo <= hi`.
    pub fn draw_in_range(&mut self, lo: PieceId, hi: PieceId) -> PieceId {
        let span = u32::from(hi - lo) + 1;
        lo + self.next_range(span) as PieceId
    }

    /// Current internal state (for restarting with the same sequence)
    pub fn seed(&self) -> u32 {
        self.state
    }
}
