//! Seeded RNG wrapper with the distributions the simulator samples from
//!
//! Wraps `StdRng` and keeps the seed it was created from, so a run can be
//! replayed by feeding the recorded seed back in.
//!
//! # Determinism
//!
//! Same seed → same sequence of draws, which is what the tests rely on.
//! Statistical realism is the requirement for generated data; the seed only
//! exists to make runs repeatable and testable.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};
use thiserror::Error;
use uuid::Uuid;

/// Invalid distribution parameters
#[derive(Debug, Error, PartialEq)]
pub enum RngError {
    #[error("invalid gaussian parameters: mean={mean}, stdev={stdev}")]
    InvalidGaussian { mean: f64, stdev: f64 },

    #[error("invalid poisson rate: {lambda}")]
    InvalidPoisson { lambda: f64 },

    #[error("cannot sample {amount} distinct items from {len}")]
    NotEnoughItems { amount: usize, len: usize },
}

/// Random number generator owned by a simulation component
///
/// # Example
/// ```
/// use kleptosyn_core::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let x = rng.gaussian(0.0, 1.0).unwrap();
/// let k = rng.poisson(8.7).unwrap();
/// assert!(x.is_finite());
/// assert!(k >= 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct RngManager {
    /// Seed the generator was created from
    seed: u64,

    rng: StdRng,
}

impl RngManager {
    /// Create a new RNG with given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create an RNG with a seed drawn from OS entropy
    ///
    /// The drawn seed is kept, so the run can still be reproduced.
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    /// Seed this generator was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform index in `[0, len)`
    ///
    /// # Panics
    /// Panics if `len == 0`
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick an index from an empty range");
        self.rng.gen_range(0..len)
    }

    /// Uniform integer in `[min, max]`
    ///
    /// # Panics
    /// Panics if `min > max`
    pub fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        assert!(min <= max, "min must not exceed max");
        self.rng.gen_range(min..=max)
    }

    /// Uniformly choose one element of a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.index(items.len());
        items.get(idx)
    }

    /// Sample `amount` distinct indices from `[0, len)`
    ///
    /// The result is in random order, so it doubles as a uniformly random
    /// `amount`-permutation of the index range.
    pub fn sample_distinct(&mut self, len: usize, amount: usize) -> Result<Vec<usize>, RngError> {
        if amount > len {
            return Err(RngError::NotEnoughItems { amount, len });
        }
        Ok(index::sample(&mut self.rng, len, amount).into_vec())
    }

    /// Sample from a Gaussian distribution
    pub fn gaussian(&mut self, mean: f64, stdev: f64) -> Result<f64, RngError> {
        let dist = Normal::new(mean, stdev).map_err(|_| RngError::InvalidGaussian { mean, stdev })?;
        Ok(dist.sample(&mut self.rng))
    }

    /// Sample from a Poisson distribution
    pub fn poisson(&mut self, lambda: f64) -> Result<f64, RngError> {
        let dist = Poisson::new(lambda).map_err(|_| RngError::InvalidPoisson { lambda })?;
        Ok(dist.sample(&mut self.rng))
    }

    /// Random UUID built from this generator's stream
    pub fn uuid(&mut self) -> Uuid {
        let bytes: [u8; 16] = self.rng.gen();
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}
