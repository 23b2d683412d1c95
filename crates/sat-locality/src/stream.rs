//! Buffered source of uniform floats in [0, 1).
//!
//! Purpose
//! - Amortize the per-call cost of the underlying RNG over millions of draws
//!   (variable bearings, clause centers, subset picks, literal signs).
//!
//! Model
//! - A batch of independently drawn floats plus a read cursor. When the cursor
//!   reaches the end, the next batch is drawn at twice the previous size.
//! - A seeded stream reproduces the whole sequence; an unseeded one draws its
//!   seed from OS entropy.

use rand::distributions::Standard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Size of the first batch.
pub const DEFAULT_BATCH: usize = 1_000_000;

pub struct RandomStream {
    rng: StdRng,
    batch: Vec<f64>,
    cursor: usize,
    next_batch: usize,
}

impl RandomStream {
    /// Stream seeded from `seed`, or from entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_batch(seed, DEFAULT_BATCH)
    }

    /// Like [`RandomStream::new`] with a custom first batch size (clamped to >= 1).
    pub fn with_batch(seed: Option<u64>, first_batch: usize) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            batch: Vec::new(),
            cursor: 0,
            next_batch: first_batch.max(1),
        }
    }

    /// Next uniform float in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        if self.cursor == self.batch.len() {
            self.refill();
        }
        let u = self.batch[self.cursor];
        self.cursor += 1;
        u
    }

    /// Uniform index in `0..bound`. `bound` must be non-zero.
    #[inline]
    pub fn next_below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        // u < 1 keeps this below `bound` except for float rounding at huge bounds.
        ((self.next_f64() * bound as f64) as usize).min(bound - 1)
    }

    /// Fair coin from one draw: `true` when the draw is below 0.5.
    #[inline]
    pub fn next_negated(&mut self) -> bool {
        self.next_f64() < 0.5
    }

    /// Size of the batch currently being read (0 before the first draw).
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    fn refill(&mut self) {
        let size = self.next_batch;
        tracing::debug!(size, "buffering random numbers");
        self.batch.clear();
        self.batch
            .extend((&mut self.rng).sample_iter::<f64, _>(Standard).take(size));
        self.cursor = 0;
        self.next_batch = size.saturating_mul(2);
    }
}

impl Iterator for RandomStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}
