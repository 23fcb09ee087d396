//! Derivative-free maximum a posteriori search.
//!
//! The models' densities are cheap but not differentiable in closed form
//! here, so the mode is found with a Nelder–Mead simplex in the
//! unconstrained space, restarted from its own best vertex until the value
//! stops improving. Curvature at the mode comes from central finite
//! differences and gives a Laplace approximation to the posterior
//! covariance.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use nalgebra::{Cholesky, DMatrix};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_RESTARTS, DEFAULT_TOLERANCE};
use crate::math;

/// Reflection coefficient.
const REFLECT: f64 = 1.0;
/// Expansion coefficient.
const EXPAND: f64 = 2.0;
/// Contraction coefficient.
const CONTRACT: f64 = 0.5;
/// Shrink coefficient.
const SHRINK: f64 = 0.5;

/// Convergence status of an optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// Simplex values agree to within the tolerance.
    Converged,
    /// Reached the iteration limit.
    MaxIterations,
    /// Simplex collapsed without the values agreeing.
    Stalled,
    /// The objective was not finite at any vertex.
    NumericalError,
}

/// Outcome of a minimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best point found.
    pub solution: Vec<f64>,
    /// Objective at `solution`.
    pub objective_value: f64,
    /// Simplex iterations performed, summed over restarts.
    pub iterations: usize,
    /// How the search ended.
    pub status: ConvergenceStatus,
}

/// Nelder–Mead settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelderMead {
    /// Iteration limit per restart.
    pub max_iterations: usize,
    /// Relative spread of vertex values accepted as converged.
    pub tolerance: f64,
    /// Edge length of the initial simplex.
    pub initial_step: f64,
    /// Additional restarts from the best vertex.
    pub restarts: usize,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            initial_step: 0.5,
            restarts: DEFAULT_RESTARTS,
        }
    }
}

impl NelderMead {
    /// Minimize `f` starting at `x0`.
    ///
    /// Non-finite objective values are treated as `+∞`, so the simplex
    /// retreats from points outside a density's support.
    pub fn minimize<F>(&self, f: F, x0: &[f64]) -> OptimizationResult
    where
        F: Fn(&[f64]) -> f64,
    {
        let objective = |x: &[f64]| {
            let v = f(x);
            if v.is_nan() {
                f64::INFINITY
            } else {
                v
            }
        };

        let mut best = self.run(&objective, x0);
        let mut iterations = best.iterations;
        for _ in 0..self.restarts {
            if best.status == ConvergenceStatus::NumericalError {
                break;
            }
            let next = self.run(&objective, &best.solution);
            iterations += next.iterations;
            let improved = best.objective_value - next.objective_value
                > self.tolerance * (math::abs(best.objective_value) + self.tolerance);
            if next.objective_value <= best.objective_value {
                best = next;
            }
            if !improved {
                break;
            }
        }
        best.iterations = iterations;
        best
    }

    fn run<F>(&self, f: &F, x0: &[f64]) -> OptimizationResult
    where
        F: Fn(&[f64]) -> f64,
    {
        let n = x0.len();
        if n == 0 {
            return OptimizationResult {
                solution: Vec::new(),
                objective_value: f(x0),
                iterations: 0,
                status: ConvergenceStatus::Converged,
            };
        }

        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(x0.to_vec());
        for i in 0..n {
            let mut v = x0.to_vec();
            v[i] += self.initial_step;
            simplex.push(v);
        }
        let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();

        let mut iterations = 0;
        let status = loop {
            order(&mut simplex, &mut values);
            let (lo, hi) = (values[0], values[n]);

            if lo == f64::INFINITY {
                break ConvergenceStatus::NumericalError;
            }
            if hi.is_finite() && hi - lo <= self.tolerance * (math::abs(lo) + self.tolerance) {
                break ConvergenceStatus::Converged;
            }
            if diameter(&simplex) < 1e-14 * (1.0 + norm(&simplex[0])) {
                break ConvergenceStatus::Stalled;
            }
            if iterations >= self.max_iterations {
                break ConvergenceStatus::MaxIterations;
            }
            iterations += 1;

            let centroid = centroid(&simplex[..n]);
            let worst = &simplex[n];

            let reflected = along(&centroid, worst, REFLECT);
            let f_reflected = f(&reflected);

            if f_reflected < values[0] {
                let expanded = along(&centroid, worst, EXPAND);
                let f_expanded = f(&expanded);
                if f_expanded < f_reflected {
                    replace_worst(&mut simplex, &mut values, expanded, f_expanded);
                } else {
                    replace_worst(&mut simplex, &mut values, reflected, f_reflected);
                }
                continue;
            }
            if f_reflected < values[n - 1] {
                replace_worst(&mut simplex, &mut values, reflected, f_reflected);
                continue;
            }

            // Contract toward the better of the worst vertex and its reflection.
            let coef = if f_reflected < values[n] {
                CONTRACT
            } else {
                -CONTRACT
            };
            let contracted = along(&centroid, worst, coef);
            let f_contracted = f(&contracted);
            if f_contracted < values[n].min(f_reflected) {
                replace_worst(&mut simplex, &mut values, contracted, f_contracted);
                continue;
            }

            let best = simplex[0].clone();
            for (vertex, value) in simplex.iter_mut().zip(values.iter_mut()).skip(1) {
                for (xi, bi) in vertex.iter_mut().zip(&best) {
                    *xi = bi + SHRINK * (*xi - bi);
                }
                *value = f(vertex);
            }
        };

        OptimizationResult {
            solution: simplex.swap_remove(0),
            objective_value: values[0],
            iterations,
            status,
        }
    }
}

/// Sort vertices by ascending objective value.
fn order(simplex: &mut [Vec<f64>], values: &mut [f64]) {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let sorted_simplex: Vec<Vec<f64>> = idx.iter().map(|&i| simplex[i].clone()).collect();
    let sorted_values: Vec<f64> = idx.iter().map(|&i| values[i]).collect();
    simplex.clone_from_slice(&sorted_simplex);
    values.copy_from_slice(&sorted_values);
}

fn centroid(vertices: &[Vec<f64>]) -> Vec<f64> {
    let n = vertices.len() as f64;
    let mut c = vec![0.0; vertices[0].len()];
    for v in vertices {
        for (ci, vi) in c.iter_mut().zip(v) {
            *ci += vi / n;
        }
    }
    c
}

/// `centroid + coef · (centroid − worst)`.
fn along(centroid: &[f64], worst: &[f64], coef: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(worst)
        .map(|(c, w)| c + coef * (c - w))
        .collect()
}

fn replace_worst(simplex: &mut [Vec<f64>], values: &mut [f64], x: Vec<f64>, fx: f64) {
    let last = values.len() - 1;
    simplex[last] = x;
    values[last] = fx;
}

fn diameter(simplex: &[Vec<f64>]) -> f64 {
    simplex[1..]
        .iter()
        .map(|v| {
            v.iter()
                .zip(&simplex[0])
                .map(|(a, b)| math::abs(a - b))
                .fold(0.0, f64::max)
        })
        .fold(0.0, f64::max)
}

fn norm(x: &[f64]) -> f64 {
    math::sqrt(x.iter().map(|v| math::sq(*v)).sum())
}

/// Central finite-difference Hessian of `f` at `x`.
///
/// Steps scale with `|x_i|` so that both small and large coordinates get a
/// usable difference quotient.
pub fn hessian<F>(f: F, x: &[f64]) -> DMatrix<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = x.len();
    let h: Vec<f64> = x.iter().map(|xi| 1e-4 * math::abs(*xi).max(1.0)).collect();
    let f0 = f(x);
    let mut point = x.to_vec();
    let mut eval = |shifts: &[(usize, f64)]| {
        point.copy_from_slice(x);
        for &(i, s) in shifts {
            point[i] += s;
        }
        f(&point)
    };

    let mut out = DMatrix::zeros(n, n);
    for i in 0..n {
        let hi = h[i];
        let fp = eval(&[(i, hi)]);
        let fm = eval(&[(i, -hi)]);
        out[(i, i)] = (fp - 2.0 * f0 + fm) / (hi * hi);
        for j in 0..i {
            let hj = h[j];
            let fpp = eval(&[(i, hi), (j, hj)]);
            let fpm = eval(&[(i, hi), (j, -hj)]);
            let fmp = eval(&[(i, -hi), (j, hj)]);
            let fmm = eval(&[(i, -hi), (j, -hj)]);
            let v = (fpp - fpm - fmp + fmm) / (4.0 * hi * hj);
            out[(i, j)] = v;
            out[(j, i)] = v;
        }
    }
    out
}

/// Laplace covariance: the inverse of the Hessian of the negative
/// log-density at its mode.
///
/// `None` if the Hessian is not finite or not positive definite, i.e. the
/// point is not a strict local mode.
pub fn laplace_covariance(hessian: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if hessian.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Cholesky::new(hessian.clone()).map(|chol| chol.inverse())
}
