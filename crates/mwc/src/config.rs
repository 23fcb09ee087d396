//! Configuration for model fitting.

use mwc_core::constants::{
    DEFAULT_CHAINS, DEFAULT_DRAWS, DEFAULT_HPD_MASS, DEFAULT_MAX_ITERATIONS, DEFAULT_RESTARTS,
    DEFAULT_SEED, DEFAULT_TOLERANCE, DEFAULT_WARMUP, TARGET_ACCEPTANCE,
};
use mwc_core::{MetropolisSampler, NelderMead};
use serde::{Deserialize, Serialize};

/// Configuration options for [`Inference`](crate::Inference).
///
/// Every field has a documented default; the builder methods on
/// `Inference` validate values before storing them here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // =========================================================================
    // Sampling
    // =========================================================================
    /// Number of independent chains.
    ///
    /// Split-R̂ needs at least two half-chains, which a single chain
    /// already provides. Default: 4.
    pub chains: usize,

    /// Warmup iterations per chain, discarded after adapting the proposal.
    ///
    /// Default: 2,000.
    pub warmup: usize,

    /// Retained draws per chain.
    ///
    /// Default: 2,000.
    pub draws: usize,

    /// Base seed. Chain `c` uses `seed + c`, so results are reproducible
    /// whether or not chains run in parallel.
    ///
    /// Default: 0x6D7763.
    pub seed: u64,

    /// Acceptance rate the warmup adapts the step size toward.
    ///
    /// Default: 0.234.
    pub target_acceptance: f64,

    /// Probability mass of the reported highest posterior density interval.
    ///
    /// Default: 0.95.
    pub hpd_mass: f64,

    /// Run chains on the rayon thread pool (requires the `parallel` feature).
    ///
    /// Default: true.
    pub parallel: bool,

    // =========================================================================
    // Optimization
    // =========================================================================
    /// Nelder–Mead iteration limit per restart.
    ///
    /// Default: 5,000.
    pub max_iterations: usize,

    /// Relative spread of simplex values accepted as converged.
    ///
    /// Default: 1e-9.
    pub tolerance: f64,

    /// Restarts of the simplex from its best vertex.
    ///
    /// Default: 3.
    pub restarts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chains: DEFAULT_CHAINS,
            warmup: DEFAULT_WARMUP,
            draws: DEFAULT_DRAWS,
            seed: DEFAULT_SEED,
            target_acceptance: TARGET_ACCEPTANCE,
            hpd_mass: DEFAULT_HPD_MASS,
            parallel: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            restarts: DEFAULT_RESTARTS,
        }
    }
}

impl Config {
    /// Optimizer settings implied by this configuration.
    pub fn optimizer(&self) -> NelderMead {
        NelderMead {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            restarts: self.restarts,
            ..NelderMead::default()
        }
    }

    /// Sampler settings implied by this configuration.
    pub fn sampler(&self) -> MetropolisSampler {
        MetropolisSampler {
            warmup: self.warmup,
            draws: self.draws,
            target_acceptance: self.target_acceptance,
            ..MetropolisSampler::default()
        }
    }

    /// Seed of chain `chain`.
    pub fn chain_seed(&self, chain: usize) -> u64 {
        self.seed.wrapping_add(chain as u64)
    }
}
