//! Seeded generator - the single deterministic random source for world generation.
//!
//! A linear congruential recurrence `seed = (seed * A + C) mod M` whose
//! outputs are `seed / M`. Every procedural entity is derived from one
//! running instance, so the order of calls is part of the world's identity.
//! Runtime effects (shake jitter, audio noise) never touch this generator.

use crate::components::Color;

/// LCG multiplier
pub const LCG_MULTIPLIER: u64 = 9301;
/// LCG increment
pub const LCG_INCREMENT: u64 = 49297;
/// LCG modulus
pub const LCG_MODULUS: u64 = 233280;

/// Seed the stock world is generated from
pub const DEFAULT_SEED: u64 = 8675309;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededGenerator {
    seed: u64,
    draws: u64,
}

impl SeededGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    /// Advance the recurrence and return a value in [0, 1)
    pub fn next_float(&mut self) -> f64 {
        self.seed = (self.seed % LCG_MODULUS * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.draws += 1;
        self.seed as f64 / LCG_MODULUS as f64
    }

    /// Uniform value in [min, max)
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        self.next_float() * (max - min) + min
    }

    /// `floor(range(min, max))`, used for every generated count
    pub fn count(&mut self, min: f64, max: f64) -> u32 {
        self.range(min, max).floor() as u32
    }

    /// Three draws, one per channel (r, g, b)
    pub fn color(&mut self) -> Color {
        let r = self.next_float() as f32;
        let g = self.next_float() as f32;
        let b = self.next_float() as f32;
        Color::new(r, g, b)
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Current recurrence state
    pub fn state(&self) -> u64 {
        self.seed
    }
}

impl Default for SeededGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
