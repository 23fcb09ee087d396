//! The interface every model exposes to the optimizer and sampler.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use crate::transform::Constraint;

/// A pure log-density over a fixed-length parameter vector.
///
/// Implementations hold their (validated, immutable) data and must be
/// reentrant: evaluating the density never mutates state, so one model can
/// serve many chains at once.
///
/// Parameter vectors are in the *constrained* space unless a method says
/// otherwise. Draws outside the support yield `f64::NEG_INFINITY`.
pub trait LogDensity {
    /// Names of the free parameters, in vector order (e.g. `"alpha_mu[1]"`).
    fn parameter_names(&self) -> Vec<String>;

    /// Support of each free parameter.
    fn constraints(&self) -> Vec<Constraint>;

    /// Joint log-density (priors plus likelihood) at `theta`.
    fn log_density(&self, theta: &[f64]) -> f64;

    /// A point inside the support to start optimization and sampling from.
    fn initial_point(&self) -> Vec<f64>;

    /// Names of quantities derived from the parameters.
    fn derived_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Values of the derived quantities at `theta`, matching [`derived_names`].
    ///
    /// [`derived_names`]: LogDensity::derived_names
    fn derived(&self, _theta: &[f64]) -> Vec<f64> {
        Vec::new()
    }

    /// Number of free parameters.
    fn dim(&self) -> usize {
        self.constraints().len()
    }

    /// Map an unconstrained vector into the constrained space.
    fn constrain(&self, x: &[f64]) -> Vec<f64> {
        self.constraints()
            .iter()
            .zip(x)
            .map(|(c, &xi)| c.to_constrained(xi))
            .collect()
    }

    /// Map a constrained vector into the unconstrained space.
    fn unconstrain(&self, theta: &[f64]) -> Vec<f64> {
        self.constraints()
            .iter()
            .zip(theta)
            .map(|(c, &yi)| c.to_unconstrained(yi))
            .collect()
    }

    /// Log-density at an unconstrained point.
    ///
    /// With `jacobian` set, adds `Σ ln |dθ/dx|` so the result is the density
    /// of `x` itself, as a sampler needs. Without it the value is the
    /// constrained density evaluated at `constrain(x)`, whose maximum is
    /// the posterior mode in the declared parameterization.
    fn log_density_unconstrained(&self, x: &[f64], jacobian: bool) -> f64 {
        let constraints = self.constraints();
        if x.len() != constraints.len() || x.iter().any(|v| v.is_nan()) {
            return f64::NEG_INFINITY;
        }
        let theta: Vec<f64> = constraints
            .iter()
            .zip(x)
            .map(|(c, &xi)| c.to_constrained(xi))
            .collect();
        let lp = self.log_density(&theta);
        if !jacobian || lp == f64::NEG_INFINITY {
            return lp;
        }
        lp + constraints
            .iter()
            .zip(x)
            .map(|(c, &xi)| c.log_abs_det_jacobian(xi))
            .sum::<f64>()
    }
}

/// Append `name[1]`, …, `name[n]` to `names`.
pub(crate) fn push_indexed(names: &mut Vec<String>, name: &str, n: usize) {
    names.extend((1..=n).map(|i| alloc::format!("{name}[{i}]")));
}
