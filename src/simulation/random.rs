//! Deterministic seeded random number generator.
//!
//! A linear congruential generator on a 31-bit state. All state updates use
//! integer arithmetic, so a given seed yields the same sequence everywhere.
//! Not suitable for anything security related.

/// LCG multiplier
const LCG_MULTIPLIER: u64 = 1_103_515_245;
/// LCG increment
const LCG_INCREMENT: u64 = 12_345;
/// State mask, equivalent to `mod 2^31`
const STATE_MASK: u64 = 0x7fff_ffff;
/// Modulus as a float divisor for `next()`
const MODULUS: f64 = 2_147_483_648.0;

/// Deterministic pseudorandom source used by every procedural category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededGenerator {
    state: u32,
}

impl SeededGenerator {
    /// Create a generator from any integer seed.
    ///
    /// Negative seeds (from negative tile indices) are reduced modulo 2^31 in
    /// two's complement, which keeps them deterministic.
    pub fn new(seed: i64) -> Self {
        Self {
            state: (seed as u64 & STATE_MASK) as u32,
        }
    }

    /// Advance the state and return a float in `[0, 1)`.
    ///
    /// Kept in f64: the largest state would round up to 1.0 in f32.
    pub fn next(&mut self) -> f64 {
        self.advance();
        self.state as f64 / MODULUS
    }

    /// `min + next() * (max - min)`
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        self.range_f64(min as f64, max as f64) as f32
    }

    /// `floor(range(min, max))`, evaluated before narrowing so it stays below `max`
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        self.range_f64(min as f64, max as f64).floor() as i32
    }

    /// One draw: true with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.next() < p as f64
    }

    /// One draw: -1.0 or +1.0 with equal probability
    pub fn side(&mut self) -> f32 {
        if self.next() < 0.5 {
            -1.0
        } else {
            1.0
        }
    }

    /// One draw: an element of `items`, or `None` for an empty slice
    /// (which consumes no draw).
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.int(0, items.len() as i32);
        items.get(index as usize)
    }

    /// Current raw state, for debugging
    pub fn state(&self) -> u32 {
        self.state
    }

    fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }

    fn advance(&mut self) {
        let next = (self.state as u64)
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT)
            & STATE_MASK;
        self.state = next as u32;
    }
}
