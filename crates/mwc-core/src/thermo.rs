//! Van't Hoff model of repressor binding energy versus temperature.
//!
//! The repressor–DNA binding energy at each temperature level is an affine
//! function of inverse absolute temperature,
//!
//! ```text
//! ε[j] = -(ΔH / T[j]) + ΔS
//! ```
//!
//! and the mean log fold-change of measurement `i` follows simple repression
//! with every repressor active:
//!
//! ```text
//! μ[i] = -ln(1 + (R[i] / N_NS) · e^{-ε[idx[i]]})
//! ln fc[i] ~ Normal(μ[i], σ)
//! ```
//!
//! Priors: `σ ~ HalfNormal(0.1)`, `ε_ref ~ Normal(-12, 6)`,
//! `ΔH ~ LogNormal(0, 10)`, `ΔS ~ LogNormal(0, 1)`.
//!
//! The reference offset `ε_ref` has a prior but does not enter the
//! likelihood; its posterior is its prior.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::architecture::log_fold_change;
use crate::constants::{
    DEL_H_PRIOR, DEL_S_PRIOR, EPSILON_PRIOR_MU, EPSILON_PRIOR_SD, KELVIN_OFFSET,
    SIGMA_PRIOR_SCALE,
};
use crate::density::{half_normal_lpdf, lognormal_lpdf, normal_lpdf};
use crate::error::{check_each, check_len, check_non_empty, zero_based, ValidationError};
use crate::math;
use crate::model::{push_indexed, LogDensity};
use crate::transform::Constraint;

/// Raw input, field-for-field as the model's data block declares it.
///
/// Indices are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermoInput {
    /// Number of temperature levels.
    #[serde(rename = "J")]
    pub j: usize,
    /// Number of measurements.
    #[serde(rename = "N")]
    pub n: usize,
    /// Temperature of each level in degrees Celsius (length `J`).
    pub temps: Vec<f64>,
    /// Temperature level of each measurement, in `1..=J` (length `N`).
    pub idx: Vec<i64>,
    /// Number of nonspecific binding sites.
    #[serde(rename = "Nns")]
    pub n_ns: f64,
    /// Repressor copy number of each measurement (length `N`).
    #[serde(rename = "R")]
    pub repressors: Vec<f64>,
    /// Observed fold-change of each measurement (length `N`).
    pub foldchange: Vec<f64>,
}

/// Validated, immutable data for the thermodynamic model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermoData {
    temp_kelvin: Vec<f64>,
    level: Vec<usize>,
    n_ns: f64,
    repressors: Vec<f64>,
    log_fold_change: Vec<f64>,
}

impl ThermoData {
    /// Validate `input` and precompute Kelvin temperatures and log fold-changes.
    ///
    /// # Errors
    /// - `LengthMismatch` if `J`/`N` disagree with the vector lengths.
    /// - `Empty` if there are no levels or no measurements.
    /// - `InvalidIndex` if a level index is outside `1..=J`.
    /// - `InvalidDomain` for non-positive `Nns` or fold-change, negative
    ///   repressor counts, or temperatures at or below absolute zero.
    pub fn new(input: &ThermoInput) -> Result<Self, ValidationError> {
        check_non_empty("temps", input.j)?;
        check_non_empty("idx", input.n)?;
        check_len("temps", input.j, input.temps.len())?;
        check_len("idx", input.n, input.idx.len())?;
        check_len("repressors", input.n, input.repressors.len())?;
        check_len("foldchange", input.n, input.foldchange.len())?;

        let level = zero_based("idx", &input.idx, input.j)?;

        if !(input.n_ns > 0.0 && input.n_ns.is_finite()) {
            return Err(ValidationError::InvalidDomain {
                field: "Nns",
                position: None,
                value: input.n_ns,
                requirement: "> 0",
            });
        }
        check_each("temps", &input.temps, "> -273.15 °C", |t| {
            t.is_finite() && t + KELVIN_OFFSET > 0.0
        })?;
        check_each("repressors", &input.repressors, ">= 0", |r| {
            r >= 0.0 && r.is_finite()
        })?;
        check_each("foldchange", &input.foldchange, "> 0", |fc| {
            fc > 0.0 && fc.is_finite()
        })?;

        Ok(Self {
            temp_kelvin: input.temps.iter().map(|t| t + KELVIN_OFFSET).collect(),
            level,
            n_ns: input.n_ns,
            repressors: input.repressors.clone(),
            log_fold_change: input.foldchange.iter().map(|&fc| math::ln(fc)).collect(),
        })
    }

    /// Number of temperature levels.
    pub fn levels(&self) -> usize {
        self.temp_kelvin.len()
    }

    /// Number of measurements.
    pub fn len(&self) -> usize {
        self.level.len()
    }

    /// Always false: validation rejects empty data.
    pub fn is_empty(&self) -> bool {
        self.level.is_empty()
    }

    /// Absolute temperature of each level.
    pub fn temp_kelvin(&self) -> &[f64] {
        &self.temp_kelvin
    }

    /// 0-based temperature level of each measurement.
    pub fn level(&self) -> &[usize] {
        &self.level
    }

    /// Natural log of each observed fold-change.
    pub fn log_fold_change(&self) -> &[f64] {
        &self.log_fold_change
    }
}

/// Free parameters of the thermodynamic model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermoParams {
    /// Noise scale of the log fold-change.
    pub sigma: f64,
    /// Reference free-energy offset (k_BT).
    pub epsilon: f64,
    /// Enthalpy-like slope against inverse temperature.
    pub del_h: f64,
    /// Entropy-like intercept.
    pub del_s: f64,
}

impl ThermoParams {
    /// Read a parameter vector in `[sigma, epsilon, del_h, del_s]` order.
    pub fn from_slice(theta: &[f64]) -> Option<Self> {
        match *theta {
            [sigma, epsilon, del_h, del_s] => Some(Self {
                sigma,
                epsilon,
                del_h,
                del_s,
            }),
            _ => None,
        }
    }

    /// The parameter vector in `[sigma, epsilon, del_h, del_s]` order.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.sigma, self.epsilon, self.del_h, self.del_s]
    }
}

/// Binding energy at absolute temperature `temp_kelvin`.
#[inline]
pub fn energy(del_h: f64, del_s: f64, temp_kelvin: f64) -> f64 {
    -(del_h / temp_kelvin) + del_s
}

/// Mean log fold-change with `repressors` copies binding with `energy`.
///
/// Exactly `0.0` when `repressors == 0`, for any energy.
#[inline]
pub fn mean_log_fold_change(repressors: f64, n_ns: f64, energy: f64) -> f64 {
    log_fold_change(1.0, repressors, n_ns, energy)
}

/// Log-density of the Van't Hoff fold-change model.
#[derive(Debug, Clone)]
pub struct ThermoModel {
    data: ThermoData,
}

impl ThermoModel {
    /// Wrap validated data.
    pub fn new(data: ThermoData) -> Self {
        Self { data }
    }

    /// Validate raw input and build the model.
    pub fn from_input(input: &ThermoInput) -> Result<Self, ValidationError> {
        ThermoData::new(input).map(Self::new)
    }

    /// The model's data.
    pub fn data(&self) -> &ThermoData {
        &self.data
    }

    /// Binding energy at each temperature level.
    pub fn energies(&self, params: &ThermoParams) -> Vec<f64> {
        self.data
            .temp_kelvin
            .iter()
            .map(|&t| energy(params.del_h, params.del_s, t))
            .collect()
    }

    /// Predicted mean log fold-change of each measurement.
    pub fn predicted_log_fold_change(&self, params: &ThermoParams) -> Vec<f64> {
        let energies = self.energies(params);
        self.data
            .level
            .iter()
            .zip(&self.data.repressors)
            .map(|(&j, &r)| mean_log_fold_change(r, self.data.n_ns, energies[j]))
            .collect()
    }

    /// Predicted fold-change of each measurement.
    pub fn predicted_fold_change(&self, params: &ThermoParams) -> Vec<f64> {
        self.predicted_log_fold_change(params)
            .into_iter()
            .map(math::exp)
            .collect()
    }

    /// Sum of the four prior log-densities.
    pub fn log_prior(&self, params: &ThermoParams) -> f64 {
        half_normal_lpdf(params.sigma, SIGMA_PRIOR_SCALE)
            + normal_lpdf(params.epsilon, EPSILON_PRIOR_MU, EPSILON_PRIOR_SD)
            + lognormal_lpdf(params.del_h, DEL_H_PRIOR.0, DEL_H_PRIOR.1)
            + lognormal_lpdf(params.del_s, DEL_S_PRIOR.0, DEL_S_PRIOR.1)
    }

    /// Log-likelihood of the observed log fold-changes.
    pub fn log_likelihood(&self, params: &ThermoParams) -> f64 {
        if !(params.sigma > 0.0) {
            return f64::NEG_INFINITY;
        }
        self.predicted_log_fold_change(params)
            .iter()
            .zip(&self.data.log_fold_change)
            .map(|(&mu, &y)| normal_lpdf(y, mu, params.sigma))
            .sum()
    }

    /// Energy implied by a single measurement, if it is informative.
    ///
    /// Inverts the fold-change formula; `None` for unrepressed measurements
    /// or fold-changes at or above one.
    fn implied_energy(&self, i: usize) -> Option<f64> {
        let r = self.data.repressors[i];
        let fc = math::exp(self.data.log_fold_change[i]);
        if r > 0.0 && fc < 1.0 {
            Some(-math::ln((1.0 / fc - 1.0) * self.data.n_ns / r))
        } else {
            None
        }
    }
}

impl LogDensity for ThermoModel {
    fn parameter_names(&self) -> Vec<String> {
        vec!["sigma".into(), "epsilon".into(), "del_h".into(), "del_s".into()]
    }

    fn constraints(&self) -> Vec<Constraint> {
        vec![
            Constraint::Positive,
            Constraint::Unconstrained,
            Constraint::Positive,
            Constraint::Positive,
        ]
    }

    fn log_density(&self, theta: &[f64]) -> f64 {
        let Some(params) = ThermoParams::from_slice(theta) else {
            return f64::NEG_INFINITY;
        };
        let prior = self.log_prior(&params);
        if prior == f64::NEG_INFINITY || prior.is_nan() {
            return f64::NEG_INFINITY;
        }
        let lp = prior + self.log_likelihood(&params);
        if lp.is_nan() {
            f64::NEG_INFINITY
        } else {
            lp
        }
    }

    /// Starts at the prior centres, with `(ΔH, ΔS)` chosen so the energy
    /// at the mean temperature matches the average energy implied by the
    /// repressed measurements.
    fn initial_point(&self) -> Vec<f64> {
        let implied: Vec<f64> = (0..self.data.len())
            .filter_map(|i| self.implied_energy(i))
            .collect();
        let t_mean =
            self.data.temp_kelvin.iter().sum::<f64>() / self.data.temp_kelvin.len() as f64;

        let (del_h, del_s) = if implied.is_empty() {
            (1.0, 1.0)
        } else {
            let e_mean = implied.iter().sum::<f64>() / implied.len() as f64;
            if e_mean < 0.0 {
                ((1.0 - e_mean) * t_mean, 1.0)
            } else {
                (1.0, e_mean + 1.0 / t_mean)
            }
        };
        ThermoParams {
            sigma: SIGMA_PRIOR_SCALE,
            epsilon: EPSILON_PRIOR_MU,
            del_h,
            del_s,
        }
        .to_vec()
    }

    fn derived_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.data.levels());
        push_indexed(&mut names, "energy", self.data.levels());
        names
    }

    fn derived(&self, theta: &[f64]) -> Vec<f64> {
        match ThermoParams::from_slice(theta) {
            Some(params) => self.energies(&params),
            None => vec![f64::NAN; self.data.levels()],
        }
    }
}
