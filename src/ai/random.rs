//! Random number source for stochastic behaviors

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform random numbers
pub trait RandomSource {
    /// Uniform value in `[min, max)`
    fn range(&mut self, min: f32, max: f32) -> f32;
}

/// Seed used when the OS has no entropy to offer
const FALLBACK_SEED: u64 = 0x853c_49e6_748f_ea9b;

/// Default random source backed by [`SmallRng`].
///
/// Not suitable for anything security related.
#[derive(Debug, Clone)]
pub struct SmallRandom {
    rng: SmallRng,
}

impl SmallRandom {
    /// Deterministic generator
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the operating system
    #[must_use]
    pub fn from_os() -> Self {
        match SmallRng::try_from_os_rng() {
            Ok(rng) => Self { rng },
            Err(err) => {
                log::warn!("No OS entropy ({err}), using fixed wander seed");
                Self::seeded(FALLBACK_SEED)
            }
        }
    }
}

impl RandomSource for SmallRandom {
    fn range(&mut self, min: f32, max: f32) -> f32 {
        // Empty ranges would panic in `random_range`
        if min < max {
            self.rng.random_range(min..max)
        } else {
            min
        }
    }
}
