//! Fit results.

use mwc_core::constants::RHAT_THRESHOLD;
use mwc_core::{Chain, ConvergenceStatus, ParameterSummary};
use serde::{Deserialize, Serialize};

/// Maximum a posteriori estimate with Laplace uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEstimate {
    /// Free parameter names, in vector order.
    pub names: Vec<String>,
    /// Parameter values at the mode.
    pub values: Vec<f64>,
    /// Laplace standard errors, mapped through the parameter transforms.
    ///
    /// `None` when the Hessian at the mode is not positive definite.
    pub std_errors: Option<Vec<f64>>,
    /// Names of derived quantities.
    pub derived_names: Vec<String>,
    /// Derived quantities at the mode.
    pub derived: Vec<f64>,
    /// Log-density at the mode.
    pub log_density: f64,
    /// How the optimizer stopped.
    pub status: ConvergenceStatus,
    /// Optimizer iterations, summed over restarts.
    pub iterations: usize,
}

impl MapEstimate {
    /// Value of a parameter or derived quantity by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        lookup(&self.names, &self.values, name)
            .or_else(|| lookup(&self.derived_names, &self.derived, name))
    }

    /// Standard error of a free parameter by name.
    pub fn std_error(&self, name: &str) -> Option<f64> {
        lookup(&self.names, self.std_errors.as_deref()?, name)
    }
}

fn lookup(names: &[String], values: &[f64], name: &str) -> Option<f64> {
    names
        .iter()
        .position(|n| n == name)
        .and_then(|i| values.get(i).copied())
}

/// Posterior draws from all chains with their summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posterior {
    /// Names of the columns of every draw: free parameters followed by
    /// derived quantities.
    pub names: Vec<String>,
    /// Per-chain draws; each draw holds one value per entry of `names`.
    pub chains: Vec<Chain>,
    /// One summary per entry of `names`.
    pub summary: Vec<ParameterSummary>,
}

impl Posterior {
    /// Summary of a column by name.
    pub fn summary_of(&self, name: &str) -> Option<&ParameterSummary> {
        self.summary.iter().find(|s| s.parameter == name)
    }

    /// Draws of a column by name, pooled over chains.
    pub fn draws(&self, name: &str) -> Option<Vec<f64>> {
        let k = self.names.iter().position(|n| n == name)?;
        Some(self.chains.iter().flat_map(|c| c.column(k)).collect())
    }

    /// Post-warmup acceptance rate of each chain.
    pub fn acceptance_rates(&self) -> Vec<f64> {
        self.chains.iter().map(|c| c.acceptance_rate).collect()
    }

    /// Whether every column's split-R̂ is below the convergence threshold.
    pub fn converged(&self) -> bool {
        self.summary.iter().all(|s| s.rhat < RHAT_THRESHOLD)
    }
}

/// Result of a full fit: the mode and the sampled posterior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fit {
    /// Posterior mode.
    pub map: MapEstimate,
    /// Sampled posterior.
    pub posterior: Posterior,
}
