//! Per-run random source.
//!
//! Every run owns its own generator, so concurrent runs never share RNG state
//! and a seeded run is reproducible no matter what else the process is doing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Random source owned by a single simulation run.
pub struct SimRng(StdRng);

impl SimRng {
    /// Deterministic generator for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Seeded when `seed` is given, OS entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Derive an independent child generator.
    ///
    /// Draws exactly one value from `self`, so the parent's sequence after
    /// the call is the same whatever the child is later used for.
    pub fn child(&mut self, offset: u64) -> Self {
        let child_seed = self.0.random::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        Self(StdRng::seed_from_u64(child_seed))
    }

    /// Expose the inner generator for `rand` helpers such as `seq::index::sample`.
    #[inline]
    pub fn inner(&mut self) -> &mut StdRng {
        &mut self.0
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }

    /// Uniform value in `[low, high)`; returns `low` for an empty range.
    #[inline]
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            self.0.random_range(low..high)
        } else {
            low
        }
    }

    /// Normally distributed value.
    #[inline]
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = self.0.sample(StandardNormal);
        mean + std_dev * z
    }
}
