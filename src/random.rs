//! Uniform random sources used to draw priorities in `[0, 1)`.
//!
//! The estimator never reaches for a global generator: it owns a [`UniformSource`],
//! which can be the seedable [`WyRand`], any `rand` generator wrapped in [`RngSource`],
//! or a plain closure returning scripted values in tests.

use rand::Rng;
use wyhash::wyrng;

/// Scale turning the top 53 bits of a `u64` into a float in `[0, 1)`
const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

/// Source of independent uniform values in `[0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<F: FnMut() -> f64> UniformSource for F {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self()
    }
}

/// Small seedable generator built on `wyrng`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WyRand {
    state: u64,
}

impl WyRand {
    #[inline]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Create generator seeded from the thread-local entropy source
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }
}

impl UniformSource for WyRand {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        (wyrng(&mut self.state) >> 11) as f64 * UNIT_SCALE
    }
}

/// Adapter drawing uniform values from any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> UniformSource for RngSource<R> {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.0.gen()
    }
}
