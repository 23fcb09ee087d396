//! Adaptive random-walk Metropolis sampler.
//!
//! Chains walk the unconstrained space of a [`LogDensity`], using the
//! Jacobian-adjusted density so that the constrained draws follow the
//! posterior. Warmup tunes the proposal in two ways:
//!
//! - a Robbins–Monro update of the global step size toward the target
//!   acceptance rate, and
//! - per-coordinate scales set from the variance of the middle half of
//!   warmup, after which the step size restarts at `2.38 / √d`.
//!
//! Each chain owns its seeded RNG, so a chain's draws depend only on its
//! seed and starting point.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DRAWS, DEFAULT_WARMUP, TARGET_ACCEPTANCE};
use crate::math;
use crate::model::LogDensity;

/// Attempts at a jittered starting point before falling back to the
/// unjittered one.
const MAX_INIT_ATTEMPTS: usize = 100;

/// Robbins–Monro gain exponent, in (0.5, 1].
const ADAPTATION_DECAY: f64 = 0.6;

/// Sampler settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetropolisSampler {
    /// Warmup iterations (discarded).
    pub warmup: usize,
    /// Retained draws.
    pub draws: usize,
    /// Acceptance rate the step size is tuned toward.
    pub target_acceptance: f64,
    /// Half-width of the uniform jitter added to the unconstrained start.
    pub initial_jitter: f64,
}

impl Default for MetropolisSampler {
    fn default() -> Self {
        Self {
            warmup: DEFAULT_WARMUP,
            draws: DEFAULT_DRAWS,
            target_acceptance: TARGET_ACCEPTANCE,
            initial_jitter: 0.5,
        }
    }
}

/// Retained draws of one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    /// Constrained parameter vectors, one per retained iteration.
    pub draws: Vec<Vec<f64>>,
    /// Constrained log-density (no Jacobian) of each draw.
    pub log_density: Vec<f64>,
    /// Fraction of accepted proposals after warmup.
    pub acceptance_rate: f64,
    /// Global step size at the end of warmup.
    pub step_size: f64,
}

impl Chain {
    /// Draws of parameter `k` in iteration order.
    pub fn column(&self, k: usize) -> Vec<f64> {
        self.draws.iter().map(|d| d[k]).collect()
    }
}

/// Running mean and variance (Welford).
#[derive(Debug, Clone)]
struct Moments {
    n: usize,
    mean: Vec<f64>,
    m2: Vec<f64>,
}

impl Moments {
    fn new(dim: usize) -> Self {
        Self {
            n: 0,
            mean: vec![0.0; dim],
            m2: vec![0.0; dim],
        }
    }

    fn push(&mut self, x: &[f64]) {
        self.n += 1;
        let n = self.n as f64;
        for ((m, s), &v) in self.mean.iter_mut().zip(self.m2.iter_mut()).zip(x) {
            let delta = v - *m;
            *m += delta / n;
            *s += delta * (v - *m);
        }
    }

    fn std_devs(&self) -> Option<Vec<f64>> {
        if self.n < 10 {
            return None;
        }
        let denom = (self.n - 1) as f64;
        Some(self.m2.iter().map(|s| math::sqrt(s / denom)).collect())
    }
}

impl MetropolisSampler {
    /// Run one chain from the constrained point `init`.
    pub fn sample<M>(&self, model: &M, init: &[f64], seed: u64) -> Chain
    where
        M: LogDensity + ?Sized,
    {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let dim = model.dim();
        let target = |x: &[f64]| model.log_density_unconstrained(x, true);

        let (mut x, mut lp) = self.starting_point(model, init, &target, &mut rng);

        let base_step = 2.38 / math::sqrt(dim.max(1) as f64);
        let mut log_step = math::ln(0.1 * base_step);
        let mut scales = vec![1.0; dim];
        let mut moments = Moments::new(dim);
        let (window_start, window_end) = (self.warmup / 4, 3 * self.warmup / 4);
        let mut adapt_t = 0usize;

        let mut draws = Vec::with_capacity(self.draws);
        let mut log_density = Vec::with_capacity(self.draws);
        let mut accepted = 0usize;
        let mut proposal = vec![0.0; dim];

        for iter in 0..self.warmup + self.draws {
            let step = math::exp(log_step);
            for ((p, &xi), &s) in proposal.iter_mut().zip(&x).zip(&scales) {
                let z: f64 = rng.sample(StandardNormal);
                *p = xi + step * s * z;
            }
            let lp_new = target(&proposal);
            let log_ratio = lp_new - lp;
            let accept_prob = if log_ratio >= 0.0 {
                1.0
            } else if log_ratio.is_nan() {
                0.0
            } else {
                math::exp(log_ratio)
            };
            let u: f64 = rng.random();
            let accept = u < accept_prob;
            if accept {
                x.copy_from_slice(&proposal);
                lp = lp_new;
            }

            if iter < self.warmup {
                adapt_t += 1;
                let gain = 1.0 / math::pow(adapt_t as f64, ADAPTATION_DECAY);
                log_step += gain * (accept_prob - self.target_acceptance);

                if iter >= window_start && iter < window_end {
                    moments.push(&x);
                }
                if iter + 1 == window_end {
                    if let Some(sd) = moments.std_devs() {
                        for (s, v) in scales.iter_mut().zip(sd) {
                            if v > 1e-8 && v.is_finite() {
                                *s = v;
                            }
                        }
                        log_step = math::ln(base_step);
                        adapt_t = 0;
                    }
                }
            } else {
                if accept {
                    accepted += 1;
                }
                draws.push(model.constrain(&x));
                log_density.push(model.log_density_unconstrained(&x, false));
            }
        }

        Chain {
            draws,
            log_density,
            acceptance_rate: if self.draws == 0 {
                0.0
            } else {
                accepted as f64 / self.draws as f64
            },
            step_size: math::exp(log_step),
        }
    }

    fn starting_point<M, F, R>(
        &self,
        model: &M,
        init: &[f64],
        target: &F,
        rng: &mut R,
    ) -> (Vec<f64>, f64)
    where
        M: LogDensity + ?Sized,
        F: Fn(&[f64]) -> f64,
        R: Rng,
    {
        let x0 = model.unconstrain(init);
        if self.initial_jitter > 0.0 {
            for _ in 0..MAX_INIT_ATTEMPTS {
                let x: Vec<f64> = x0
                    .iter()
                    .map(|v| v + self.initial_jitter * (2.0 * rng.random::<f64>() - 1.0))
                    .collect();
                let lp = target(&x);
                if lp.is_finite() {
                    return (x, lp);
                }
            }
        }
        let lp = target(&x0);
        (x0, lp)
    }
}
