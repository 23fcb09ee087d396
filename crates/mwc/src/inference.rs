//! Builder that fits a [`LogDensity`] by optimization and sampling.

use mwc_core::constants::RHAT_THRESHOLD;
use mwc_core::optimize::{hessian, laplace_covariance};
use mwc_core::summary::summarize;
use mwc_core::{Chain, ConvergenceStatus, LogDensity};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::Config;
use crate::error::FitError;
use crate::result::{Fit, MapEstimate, Posterior};

/// Effective sample sizes below this are reported as a warning.
const LOW_ESS: f64 = 100.0;

/// Acceptance rates outside this range are reported as a warning.
const ACCEPTANCE_RANGE: (f64, f64) = (0.05, 0.8);

/// Fits models with a fixed configuration.
///
/// # Example
///
/// ```ignore
/// use mwc::{Inference, ThermoModel};
///
/// let model = ThermoModel::from_input(&input)?;
/// let posterior = Inference::new()
///     .chains(4)
///     .draws(1_000)
///     .seed(7)
///     .sample(&model)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Inference {
    config: Config,
}

impl Inference {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an existing configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the number of chains.
    ///
    /// Default: 4
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0.
    pub fn chains(mut self, n: usize) -> Self {
        assert!(n > 0, "chains must be > 0 (got {})", n);
        self.config.chains = n;
        self
    }

    /// Set warmup iterations per chain.
    ///
    /// Default: 2,000
    pub fn warmup(mut self, n: usize) -> Self {
        self.config.warmup = n;
        self
    }

    /// Set retained draws per chain.
    ///
    /// Default: 2,000
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0.
    pub fn draws(mut self, n: usize) -> Self {
        assert!(n > 0, "draws must be > 0 (got {})", n);
        self.config.draws = n;
        self
    }

    /// Set the base seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the mass of the reported HPD interval.
    ///
    /// Default: 0.95
    ///
    /// # Panics
    ///
    /// Panics if `mass` is not in (0, 1).
    pub fn hpd_mass(mut self, mass: f64) -> Self {
        assert!(
            mass > 0.0 && mass < 1.0,
            "hpd_mass must be in (0, 1), got {}",
            mass
        );
        self.config.hpd_mass = mass;
        self
    }

    /// Set the optimizer iteration limit per restart.
    ///
    /// Default: 5,000
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0.
    pub fn max_iterations(mut self, n: usize) -> Self {
        assert!(n > 0, "max_iterations must be > 0 (got {})", n);
        self.config.max_iterations = n;
        self
    }

    /// Set the optimizer convergence tolerance.
    ///
    /// Default: 1e-9
    ///
    /// # Panics
    ///
    /// Panics if `tol` is not positive and finite.
    pub fn tolerance(mut self, tol: f64) -> Self {
        assert!(
            tol > 0.0 && tol.is_finite(),
            "tolerance must be positive and finite, got {}",
            tol
        );
        self.config.tolerance = tol;
        self
    }

    /// Set the number of optimizer restarts.
    ///
    /// Default: 3
    pub fn restarts(mut self, n: usize) -> Self {
        self.config.restarts = n;
        self
    }

    /// Run chains in parallel when the `parallel` feature is enabled.
    ///
    /// Default: true
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.config.parallel = enabled;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Find the posterior mode.
    ///
    /// The search runs in the unconstrained space on the constrained
    /// density (no Jacobian), so the mode is that of the parameters as
    /// declared. Standard errors come from the Hessian there and are mapped
    /// back through each transform's derivative.
    ///
    /// # Errors
    ///
    /// - [`FitError::InvalidInitialPoint`] if the model's initial point has
    ///   a non-finite log-density.
    /// - [`FitError::Optimization`] if no finite objective was found.
    pub fn optimize<M>(&self, model: &M) -> Result<MapEstimate, FitError>
    where
        M: LogDensity + ?Sized,
    {
        let constraints = model.constraints();
        let x0 = model.unconstrain(&model.initial_point());
        let lp0 = model.log_density_unconstrained(&x0, false);
        if !lp0.is_finite() {
            return Err(FitError::InvalidInitialPoint { log_density: lp0 });
        }

        let objective = |x: &[f64]| -model.log_density_unconstrained(x, false);
        let result = self.config.optimizer().minimize(objective, &x0);
        match result.status {
            ConvergenceStatus::NumericalError => {
                return Err(FitError::Optimization {
                    status: result.status,
                })
            }
            ConvergenceStatus::Converged => {}
            status => tracing::warn!(
                "optimizer stopped without converging ({:?}) after {} iterations",
                status,
                result.iterations
            ),
        }

        let x = &result.solution;
        let std_errors = laplace_covariance(&hessian(objective, x)).map(|cov| {
            constraints
                .iter()
                .zip(x)
                .enumerate()
                .map(|(i, (c, &xi))| cov[(i, i)].sqrt() * c.log_abs_det_jacobian(xi).exp())
                .collect::<Vec<f64>>()
        });
        if std_errors.is_none() {
            tracing::warn!("Hessian at the mode is not positive definite; no standard errors");
        }

        let values = model.constrain(x);
        let estimate = MapEstimate {
            names: model.parameter_names(),
            derived_names: model.derived_names(),
            derived: model.derived(&values),
            values,
            std_errors,
            log_density: -result.objective_value,
            status: result.status,
            iterations: result.iterations,
        };
        tracing::debug!(
            "mode found: log-density {:.4} after {} iterations",
            estimate.log_density,
            estimate.iterations
        );
        Ok(estimate)
    }

    /// Draw from the posterior with independent chains.
    ///
    /// Chains start near the model's initial point, each seeded from the
    /// base seed, and are summarized together with the model's derived
    /// quantities.
    ///
    /// # Errors
    ///
    /// [`FitError::InvalidInitialPoint`] if the model's initial point has a
    /// non-finite log-density.
    pub fn sample<M>(&self, model: &M) -> Result<Posterior, FitError>
    where
        M: LogDensity + Sync + ?Sized,
    {
        let init = model.initial_point();
        let lp0 = model.log_density(&init);
        if !lp0.is_finite() {
            return Err(FitError::InvalidInitialPoint { log_density: lp0 });
        }

        let chains = self.run_chains(model, &init);
        let chains: Vec<Chain> = chains
            .into_iter()
            .map(|chain| with_derived(model, chain))
            .collect();

        let mut names = model.parameter_names();
        names.extend(model.derived_names());

        let log_density: Vec<Vec<f64>> = chains.iter().map(|c| c.log_density.clone()).collect();
        let summary = names
            .iter()
            .enumerate()
            .filter_map(|(k, name)| {
                let columns: Vec<Vec<f64>> = chains.iter().map(|c| c.column(k)).collect();
                summarize(name, &columns, &log_density, self.config.hpd_mass)
            })
            .collect();

        let posterior = Posterior {
            names,
            chains,
            summary,
        };
        self.report(&posterior);
        Ok(posterior)
    }

    /// Find the mode, then sample.
    ///
    /// # Errors
    ///
    /// See [`Inference::optimize`] and [`Inference::sample`].
    pub fn fit<M>(&self, model: &M) -> Result<Fit, FitError>
    where
        M: LogDensity + Sync + ?Sized,
    {
        tracing::info!(
            "fitting {} parameters: {} chains x {} draws",
            model.dim(),
            self.config.chains,
            self.config.draws
        );
        let map = self.optimize(model)?;
        let posterior = self.sample(model)?;
        tracing::info!(
            "fit complete: mode log-density {:.4}, converged: {}",
            map.log_density,
            posterior.converged()
        );
        Ok(Fit { map, posterior })
    }

    fn run_chains<M>(&self, model: &M, init: &[f64]) -> Vec<Chain>
    where
        M: LogDensity + Sync + ?Sized,
    {
        let sampler = self.config.sampler();
        let run = |c: usize| {
            let chain = sampler.sample(model, init, self.config.chain_seed(c));
            tracing::debug!(
                "chain {}: acceptance {:.3}, step size {:.4}",
                c,
                chain.acceptance_rate,
                chain.step_size
            );
            chain
        };

        #[cfg(feature = "parallel")]
        if self.config.parallel {
            return (0..self.config.chains).into_par_iter().map(run).collect();
        }

        (0..self.config.chains).map(run).collect()
    }

    fn report(&self, posterior: &Posterior) {
        for (c, rate) in posterior.acceptance_rates().iter().enumerate() {
            if *rate < ACCEPTANCE_RANGE.0 || *rate > ACCEPTANCE_RANGE.1 {
                tracing::warn!("chain {} acceptance rate {:.3} is poorly tuned", c, rate);
            }
        }
        for s in &posterior.summary {
            if s.rhat > RHAT_THRESHOLD {
                tracing::warn!(
                    "{}: R-hat {:.3} exceeds {}; chains have not mixed",
                    s.parameter,
                    s.rhat,
                    RHAT_THRESHOLD
                );
            }
            if s.ess < LOW_ESS {
                tracing::warn!("{}: effective sample size {:.0} is low", s.parameter, s.ess);
            }
        }
    }
}

/// Append the model's derived quantities to every draw.
fn with_derived<M>(model: &M, mut chain: Chain) -> Chain
where
    M: LogDensity + ?Sized,
{
    if model.derived_names().is_empty() {
        return chain;
    }
    for draw in &mut chain.draws {
        let derived = model.derived(draw);
        draw.extend(derived);
    }
    chain
}
