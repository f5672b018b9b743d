//! Deterministic random source
//!
//! The engine's only source of nondeterminism. Every probabilistic decision
//! takes exactly one draw, so the *order* of calls is part of the engine's
//! observable behavior: same seed + same call order = same game.
//!
//! ## Fixed-point scale
//! All probability checks use basis points (`0..10_000`) and strict `<`:
//! `chance(0.4537)` succeeds when `roll() < 4537`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Resolution of [`SimRng::roll`] (basis points).
pub const ROLL_SCALE: u32 = 10_000;

/// Probability in `[0, 1]` → basis points, rounded to nearest.
#[inline]
pub fn to_basis_points(p: f64) -> u32 {
    if p.is_nan() {
        return 0;
    }
    (p.clamp(0.0, 1.0) * ROLL_SCALE as f64).round() as u32
}

/// Seeded integer generator with a draw counter.
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: ChaCha8Rng,
    seed: u64,
    draws: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws consumed so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Uniform integer in `[min, max]`. `min == max` returns without a draw.
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max, "range({min}, {max})");
        if min >= max {
            return min;
        }
        self.draws += 1;
        self.inner.gen_range(min..=max)
    }

    /// Uniform integer in `[0, bound)`. A bound of 0 or 1 returns 0 without a draw.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        if bound <= 1 {
            return 0;
        }
        self.draws += 1;
        self.inner.gen_range(0..bound)
    }

    /// One high-resolution draw in `[0, ROLL_SCALE)`.
    pub fn roll(&mut self) -> u32 {
        self.draws += 1;
        self.inner.gen_range(0..ROLL_SCALE)
    }

    /// One draw against probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        let threshold = to_basis_points(p);
        self.roll() < threshold
    }
}
