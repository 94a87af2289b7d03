use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::args::PositiveU64;

use super::IntervalGenerator;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Exponentially distributed delays: Poisson arrivals at an average rate.
#[derive(Debug, Clone)]
pub struct ExponentialInterval {
    nanos_per_query: f64,
    rng: StdRng,
}

impl ExponentialInterval {
    #[must_use]
    pub fn new(queries_per_second: PositiveU64) -> Self {
        Self::with_rng(queries_per_second, StdRng::from_entropy())
    }

    /// Same distribution, reproducible sequence.
    #[must_use]
    pub fn with_seed(queries_per_second: PositiveU64, seed: u64) -> Self {
        Self::with_rng(queries_per_second, StdRng::seed_from_u64(seed))
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "rate conversion is inherently floating point"
    )]
    fn with_rng(queries_per_second: PositiveU64, rng: StdRng) -> Self {
        Self {
            nanos_per_query: NANOS_PER_SEC / queries_per_second.get() as f64,
            rng,
        }
    }

    /// Uniform sample in the open interval (0, 1).
    fn sample_open_unit(&mut self) -> f64 {
        loop {
            let value: f64 = self.rng.r#gen();
            if value > 0.0 {
                return value;
            }
        }
    }
}

impl IntervalGenerator for ExponentialInterval {
    #[expect(
        clippy::float_arithmetic,
        reason = "inverse transform sampling of the exponential distribution"
    )]
    fn next_interval(&mut self, _elapsed_nanos: u64) -> i64 {
        let uniform = self.sample_open_unit();
        let delay = -uniform.ln() * self.nanos_per_query;
        // `as` saturates at the integer bounds.
        delay as i64
    }
}
