//! Fluorescence calibration factor from sibling-cell partitioning.
//!
//! At division a mother cell's `N` fluorescent molecules are split between
//! its daughters as `Binomial(N, 1/2)`. With intensities `I = α·n`, the
//! statistics of `(I1, I2)` pairs identify the calibration factor `α`
//! (fluorescence per molecule) without any absolute count; this is the
//! fluctuation method. Each pair contributes
//! [`partition_lpdf`](crate::density::partition_lpdf).
//!
//! # Hierarchical model
//!
//! Growth conditions (`J1` groups) contain experiments (`J2`), each
//! contributing pairs of sibling intensities. In the non-centered
//! parameterization
//!
//! ```text
//! α_μ[g]   ~ LogNormal(3, 3),   0 ≤ α_μ ≤ 4096
//! τ        ~ HalfNormal(1)
//! α_raw[e] ~ HalfNormal(1)      (or Normal(0, 1), see DeviationSupport)
//! α[e]     = α_μ[group(e)] + τ · α_raw[e]
//! ```
//!
//! and every pair of experiment `e` is scored at `α[e]`.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ALPHA_MU_PRIOR, ALPHA_MU_UPPER, SINGLE_ALPHA_PRIOR_SCALE, TAU_PRIOR_SCALE,
};
use crate::density::{half_normal_lpdf, lognormal_lpdf, normal_lpdf, partition_lpdf};
use crate::error::{check_each, check_len, check_non_empty, zero_based, ValidationError};
use crate::model::{push_indexed, LogDensity};
use crate::transform::Constraint;

/// Raw input, field-for-field as the model's data block declares it.
///
/// Indices are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationInput {
    /// Number of growth-condition groups.
    #[serde(rename = "J1")]
    pub j1: usize,
    /// Number of experiments.
    #[serde(rename = "J2")]
    pub j2: usize,
    /// Number of sibling pairs.
    #[serde(rename = "N")]
    pub n: usize,
    /// Group of each experiment, in `1..=J1` (length `J2`).
    pub index_1: Vec<i64>,
    /// Experiment of each pair, in `1..=J2` (length `N`).
    pub index_2: Vec<i64>,
    /// Intensity of the first sibling (length `N`).
    #[serde(rename = "I_1")]
    pub i_1: Vec<f64>,
    /// Intensity of the second sibling (length `N`).
    #[serde(rename = "I_2")]
    pub i_2: Vec<f64>,
}

/// Validated, immutable data for the hierarchical calibration model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationData {
    groups: usize,
    group_of_experiment: Vec<usize>,
    experiment_of_pair: Vec<usize>,
    i_1: Vec<f64>,
    i_2: Vec<f64>,
}

impl CalibrationData {
    /// Validate `input` and convert its indices to 0-based.
    ///
    /// # Errors
    /// - `LengthMismatch` if `J2`/`N` disagree with the vector lengths.
    /// - `Empty` if there are no groups, experiments or pairs.
    /// - `InvalidIndex` if an experiment's group is outside `1..=J1` or a
    ///   pair's experiment is outside `1..=J2`.
    /// - `InvalidDomain` for negative or non-finite intensities.
    pub fn new(input: &CalibrationInput) -> Result<Self, ValidationError> {
        check_non_empty("J1", input.j1)?;
        check_non_empty("index_1", input.j2)?;
        check_non_empty("index_2", input.n)?;
        check_len("index_1", input.j2, input.index_1.len())?;
        check_len("index_2", input.n, input.index_2.len())?;
        check_len("I_1", input.n, input.i_1.len())?;
        check_len("I_2", input.n, input.i_2.len())?;

        let group_of_experiment = zero_based("index_1", &input.index_1, input.j1)?;
        let experiment_of_pair = zero_based("index_2", &input.index_2, input.j2)?;
        check_intensities(&input.i_1, &input.i_2)?;

        Ok(Self {
            groups: input.j1,
            group_of_experiment,
            experiment_of_pair,
            i_1: input.i_1.clone(),
            i_2: input.i_2.clone(),
        })
    }

    /// Number of growth-condition groups.
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Number of experiments.
    pub fn experiments(&self) -> usize {
        self.group_of_experiment.len()
    }

    /// Number of sibling pairs.
    pub fn len(&self) -> usize {
        self.experiment_of_pair.len()
    }

    /// Always false: validation rejects empty data.
    pub fn is_empty(&self) -> bool {
        self.experiment_of_pair.is_empty()
    }

    /// 0-based group of each experiment.
    pub fn group_of_experiment(&self) -> &[usize] {
        &self.group_of_experiment
    }

    /// 0-based experiment of each pair.
    pub fn experiment_of_pair(&self) -> &[usize] {
        &self.experiment_of_pair
    }

    /// Intensity pairs belonging to experiment `e` (0-based).
    pub fn pairs_of(&self, e: usize) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.experiment_of_pair
            .iter()
            .zip(self.i_1.iter().zip(&self.i_2))
            .filter(move |(&exp, _)| exp == e)
            .map(|(_, (&a, &b))| (a, b))
    }
}

fn check_intensities(i_1: &[f64], i_2: &[f64]) -> Result<(), ValidationError> {
    let ok = |v: f64| v >= 0.0 && v.is_finite();
    check_each("I_1", i_1, ">= 0", ok)?;
    check_each("I_2", i_2, ">= 0", ok)
}

/// Moment estimate of the calibration factor.
///
/// Binomial partitioning gives `⟨(I1 − I2)²⟩ = α ⟨I1 + I2⟩`, so
/// `α̂ = Σ (I1 − I2)² / Σ (I1 + I2)`. `None` when the pairs carry no
/// fluorescence or no fluctuation.
pub fn fluctuation_estimate(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let (fluct, summed) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(f, s), (a, b)| (f + (a - b) * (a - b), s + a + b));
    let alpha = fluct / summed;
    (alpha > 0.0 && alpha.is_finite()).then_some(alpha)
}

/// Non-centered calibration factor `alpha_mu + tau · raw`.
#[inline]
pub fn non_centered(alpha_mu: f64, tau: f64, raw: f64) -> f64 {
    alpha_mu + tau * raw
}

/// Support of the raw per-experiment deviations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviationSupport {
    /// `α_raw ≥ 0` with a half-normal(1) prior; every `α[e] ≥ α_μ`, so the
    /// factor stays positive by construction.
    #[default]
    NonNegative,
    /// `α_raw ∈ ℝ` with a normal(0, 1) prior; draws giving `α[e] ≤ 0` are
    /// rejected by the density.
    Unbounded,
}

/// Log-density of the hierarchical calibration-factor model.
///
/// Parameter layout: `[alpha_mu[1..=J1], tau, alpha_raw[1..=J2]]`.
#[derive(Debug, Clone)]
pub struct HierarchicalCalibration {
    data: CalibrationData,
    support: DeviationSupport,
}

impl HierarchicalCalibration {
    /// Wrap validated data with non-negative deviations.
    pub fn new(data: CalibrationData) -> Self {
        Self {
            data,
            support: DeviationSupport::default(),
        }
    }

    /// Validate raw input and build the model.
    pub fn from_input(input: &CalibrationInput) -> Result<Self, ValidationError> {
        CalibrationData::new(input).map(Self::new)
    }

    /// Choose the support of the raw deviations.
    pub fn with_support(mut self, support: DeviationSupport) -> Self {
        self.support = support;
        self
    }

    /// The model's data.
    pub fn data(&self) -> &CalibrationData {
        &self.data
    }

    /// Support of the raw deviations.
    pub fn support(&self) -> DeviationSupport {
        self.support
    }

    fn split<'a>(&self, theta: &'a [f64]) -> Option<(&'a [f64], f64, &'a [f64])> {
        let groups = self.data.groups();
        if theta.len() != groups + 1 + self.data.experiments() {
            return None;
        }
        let (alpha_mu, rest) = theta.split_at(groups);
        Some((alpha_mu, rest[0], &rest[1..]))
    }

    /// Calibration factor of each experiment, `None` on a wrong-length vector.
    pub fn calibration_factors(&self, theta: &[f64]) -> Option<Vec<f64>> {
        let (alpha_mu, tau, raw) = self.split(theta)?;
        Some(
            self.data
                .group_of_experiment
                .iter()
                .zip(raw)
                .map(|(&g, &r)| non_centered(alpha_mu[g], tau, r))
                .collect(),
        )
    }

    fn log_prior(&self, alpha_mu: &[f64], tau: f64, raw: &[f64]) -> f64 {
        let mut lp = 0.0;
        for &mu in alpha_mu {
            if !(mu > 0.0 && mu <= ALPHA_MU_UPPER) {
                return f64::NEG_INFINITY;
            }
            lp += lognormal_lpdf(mu, ALPHA_MU_PRIOR.0, ALPHA_MU_PRIOR.1);
        }
        lp += half_normal_lpdf(tau, TAU_PRIOR_SCALE);
        let raw_lpdf: fn(f64) -> f64 = match self.support {
            DeviationSupport::NonNegative => |r| half_normal_lpdf(r, 1.0),
            DeviationSupport::Unbounded => |r| normal_lpdf(r, 0.0, 1.0),
        };
        lp + raw.iter().map(|&r| raw_lpdf(r)).sum::<f64>()
    }
}

impl LogDensity for HierarchicalCalibration {
    fn parameter_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.dim());
        push_indexed(&mut names, "alpha_mu", self.data.groups());
        names.push("tau".into());
        push_indexed(&mut names, "alpha_raw", self.data.experiments());
        names
    }

    fn constraints(&self) -> Vec<Constraint> {
        let raw = match self.support {
            DeviationSupport::NonNegative => Constraint::Positive,
            DeviationSupport::Unbounded => Constraint::Unconstrained,
        };
        let mut constraints = vec![
            Constraint::Interval {
                lower: 0.0,
                upper: ALPHA_MU_UPPER,
            };
            self.data.groups()
        ];
        constraints.push(Constraint::Positive);
        constraints.extend(core::iter::repeat(raw).take(self.data.experiments()));
        constraints
    }

    fn log_density(&self, theta: &[f64]) -> f64 {
        let Some((alpha_mu, tau, raw)) = self.split(theta) else {
            return f64::NEG_INFINITY;
        };
        let prior = self.log_prior(alpha_mu, tau, raw);
        if prior == f64::NEG_INFINITY || prior.is_nan() {
            return f64::NEG_INFINITY;
        }
        let Some(alpha) = self.calibration_factors(theta) else {
            return f64::NEG_INFINITY;
        };
        if alpha.iter().any(|&a| !(a > 0.0)) {
            return f64::NEG_INFINITY;
        }
        let likelihood: f64 = self
            .data
            .experiment_of_pair
            .iter()
            .zip(self.data.i_1.iter().zip(&self.data.i_2))
            .map(|(&e, (&i1, &i2))| partition_lpdf(i1, i2, alpha[e]))
            .sum();
        let lp = prior + likelihood;
        if lp.is_nan() {
            f64::NEG_INFINITY
        } else {
            lp
        }
    }

    /// Group means at the smallest moment estimate among their experiments,
    /// `tau = 1`, and raw deviations reproducing each experiment's estimate.
    fn initial_point(&self) -> Vec<f64> {
        let experiments = self.data.experiments();
        let estimates: Vec<f64> = (0..experiments)
            .map(|e| {
                fluctuation_estimate(self.data.pairs_of(e))
                    .unwrap_or(1.0)
                    .clamp(1e-3, 0.9 * ALPHA_MU_UPPER)
            })
            .collect();

        let mut alpha_mu = vec![f64::INFINITY; self.data.groups()];
        let mut group_sum = vec![0.0; self.data.groups()];
        let mut group_count = vec![0usize; self.data.groups()];
        for (e, &g) in self.data.group_of_experiment.iter().enumerate() {
            alpha_mu[g] = alpha_mu[g].min(estimates[e]);
            group_sum[g] += estimates[e];
            group_count[g] += 1;
        }
        for g in 0..alpha_mu.len() {
            if group_count[g] == 0 {
                alpha_mu[g] = 20.0;
            } else if self.support == DeviationSupport::Unbounded {
                alpha_mu[g] = group_sum[g] / group_count[g] as f64;
            }
        }

        let tau = 1.0;
        let mut theta = alpha_mu.clone();
        theta.push(tau);
        theta.extend(self.data.group_of_experiment.iter().enumerate().map(|(e, &g)| {
            let raw = (estimates[e] - alpha_mu[g]) / tau;
            match self.support {
                // Strictly inside the support so the log transform is finite.
                DeviationSupport::NonNegative => raw.max(1e-3),
                DeviationSupport::Unbounded => raw,
            }
        }));
        theta
    }

    fn derived_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.data.experiments());
        push_indexed(&mut names, "alpha", self.data.experiments());
        names
    }

    fn derived(&self, theta: &[f64]) -> Vec<f64> {
        self.calibration_factors(theta)
            .unwrap_or_else(|| vec![f64::NAN; self.data.experiments()])
    }
}

/// Single-experiment calibration posterior.
///
/// `α ~ HalfNormal(500)`, every pair scored with [`partition_lpdf`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleCalibration {
    i_1: Vec<f64>,
    i_2: Vec<f64>,
}

impl SingleCalibration {
    /// Validate a set of sibling pairs.
    pub fn new(i_1: Vec<f64>, i_2: Vec<f64>) -> Result<Self, ValidationError> {
        check_non_empty("I_1", i_1.len())?;
        check_len("I_2", i_1.len(), i_2.len())?;
        check_intensities(&i_1, &i_2)?;
        Ok(Self { i_1, i_2 })
    }

    /// Moment estimate of the pairs' calibration factor.
    pub fn fluctuation_estimate(&self) -> Option<f64> {
        fluctuation_estimate(self.i_1.iter().copied().zip(self.i_2.iter().copied()))
    }
}

impl LogDensity for SingleCalibration {
    fn parameter_names(&self) -> Vec<String> {
        vec!["alpha".into()]
    }

    fn constraints(&self) -> Vec<Constraint> {
        vec![Constraint::Positive]
    }

    fn log_density(&self, theta: &[f64]) -> f64 {
        let [alpha] = *theta else {
            return f64::NEG_INFINITY;
        };
        if !(alpha > 0.0) {
            return f64::NEG_INFINITY;
        }
        let lp = half_normal_lpdf(alpha, SINGLE_ALPHA_PRIOR_SCALE)
            + self
                .i_1
                .iter()
                .zip(&self.i_2)
                .map(|(&i1, &i2)| partition_lpdf(i1, i2, alpha))
                .sum::<f64>();
        if lp.is_nan() {
            f64::NEG_INFINITY
        } else {
            lp
        }
    }

    fn initial_point(&self) -> Vec<f64> {
        vec![self.fluctuation_estimate().unwrap_or(SINGLE_ALPHA_PRIOR_SCALE)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    /// Pairs whose squared difference is exactly `alpha` times their sum.
    pub(crate) fn exact_pairs(alpha: f64, totals: &[f64]) -> (Vec<f64>, Vec<f64>) {
        totals
            .iter()
            .map(|&t| {
                let d = math::sqrt(alpha * t);
                ((t + d) / 2.0, (t - d) / 2.0)
            })
            .unzip()
    }

    fn scenario_input() -> CalibrationInput {
        let (mut i_1, mut i_2) = exact_pairs(100.0, &[4000.0, 9000.0]);
        let (a, b) = exact_pairs(150.0, &[6000.0, 12000.0]);
        i_1.extend(a);
        i_2.extend(b);
        CalibrationInput {
            j1: 1,
            j2: 2,
            n: 4,
            index_1: vec![1, 1],
            index_2: vec![1, 1, 2, 2],
            i_1,
            i_2,
        }
    }

    #[test]
    fn test_data_validation() {
        let data = CalibrationData::new(&scenario_input()).unwrap();
        assert_eq!(data.groups(), 1);
        assert_eq!(data.experiments(), 2);
        assert_eq!(data.len(), 4);
        assert_eq!(data.experiment_of_pair(), &[0, 0, 1, 1]);
        assert_eq!(data.pairs_of(1).count(), 2);
    }

    #[test]
    fn test_rejects_bad_indices() {
        let mut input = scenario_input();
        input.index_1[1] = 2;
        assert!(matches!(
            CalibrationData::new(&input),
            Err(ValidationError::InvalidIndex {
                field: "index_1",
                position: 1,
                value: 2,
                max: 1
            })
        ));

        let mut input = scenario_input();
        input.index_2[0] = 3;
        assert!(matches!(
            CalibrationData::new(&input),
            Err(ValidationError::InvalidIndex { field: "index_2", .. })
        ));
    }

    #[test]
    fn test_rejects_negative_intensity() {
        let mut input = scenario_input();
        input.i_2[3] = -0.5;
        assert!(matches!(
            CalibrationData::new(&input),
            Err(ValidationError::InvalidDomain {
                field: "I_2",
                position: Some(3),
                ..
            })
        ));
    }

    #[test]
    fn test_zero_intensity_pairs_are_valid() {
        let mut input = scenario_input();
        input.i_1[0] = 0.0;
        input.i_2[0] = 0.0;
        let model = HierarchicalCalibration::from_input(&input).unwrap();
        let lp = model.log_density(&[120.0, 5.0, 0.5, 1.5]);
        assert!(lp.is_finite());
    }

    #[test]
    fn test_fluctuation_estimate_recovers_alpha() {
        let (i_1, i_2) = exact_pairs(250.0, &[1000.0, 5000.0, 20000.0]);
        let alpha = fluctuation_estimate(i_1.into_iter().zip(i_2)).unwrap();
        assert_relative_eq!(alpha, 250.0, epsilon = 1e-9);
        assert_eq!(fluctuation_estimate([(10.0, 10.0)]), None);
        assert_eq!(fluctuation_estimate(core::iter::empty()), None);
    }

    #[test]
    fn test_parameter_layout() {
        let model = HierarchicalCalibration::from_input(&scenario_input()).unwrap();
        assert_eq!(
            model.parameter_names(),
            ["alpha_mu[1]", "tau", "alpha_raw[1]", "alpha_raw[2]"]
        );
        assert_eq!(model.derived_names(), ["alpha[1]", "alpha[2]"]);
        assert_eq!(model.dim(), 4);
        assert_eq!(
            model.calibration_factors(&[100.0, 10.0, 0.0, 5.0]).unwrap(),
            [100.0, 150.0]
        );
        assert!(model.calibration_factors(&[100.0, 10.0]).is_none());
    }

    #[test]
    fn test_density_decomposes() {
        let input = scenario_input();
        let model = HierarchicalCalibration::from_input(&input).unwrap();
        let theta = [110.0, 4.0, 0.5, 10.0];
        let alpha = [112.0, 150.0];
        let mut manual = lognormal_lpdf(110.0, 3.0, 3.0)
            + half_normal_lpdf(4.0, 1.0)
            + half_normal_lpdf(0.5, 1.0)
            + half_normal_lpdf(10.0, 1.0);
        for i in 0..4 {
            let e = input.index_2[i] as usize - 1;
            manual += partition_lpdf(input.i_1[i], input.i_2[i], alpha[e]);
        }
        assert_relative_eq!(model.log_density(&theta), manual, epsilon = 1e-9);
    }

    #[test]
    fn test_soft_rejection() {
        let model = HierarchicalCalibration::from_input(&scenario_input()).unwrap();
        // alpha_mu outside [0, 4096]
        assert_eq!(model.log_density(&[0.0, 1.0, 1.0, 1.0]), f64::NEG_INFINITY);
        assert_eq!(model.log_density(&[5000.0, 1.0, 1.0, 1.0]), f64::NEG_INFINITY);
        // negative tau or raw deviation
        assert_eq!(model.log_density(&[100.0, -1.0, 1.0, 1.0]), f64::NEG_INFINITY);
        assert_eq!(model.log_density(&[100.0, 1.0, -1.0, 1.0]), f64::NEG_INFINITY);
        // wrong length
        assert_eq!(model.log_density(&[100.0, 1.0]), f64::NEG_INFINITY);

        let unbounded = model.with_support(DeviationSupport::Unbounded);
        // negative raw deviations are allowed until alpha itself turns non-positive
        assert!(unbounded.log_density(&[100.0, 10.0, -1.0, 1.0]).is_finite());
        assert_eq!(
            unbounded.log_density(&[100.0, 10.0, -10.0, 1.0]),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn test_initial_points_inside_support() {
        for support in [DeviationSupport::NonNegative, DeviationSupport::Unbounded] {
            let model = HierarchicalCalibration::from_input(&scenario_input())
                .unwrap()
                .with_support(support);
            let init = model.initial_point();
            assert!(model.log_density(&init).is_finite(), "{support:?}");
            for (c, v) in model.constraints().iter().zip(&init) {
                assert!(c.contains(*v), "{support:?}: {v} outside {c:?}");
            }
            let alpha = model.derived(&init);
            assert_relative_eq!(alpha[0], 100.0, epsilon = 0.01);
            assert_relative_eq!(alpha[1], 150.0, epsilon = 0.01);
        }
    }

    #[test]
    fn test_single_calibration_prefers_true_alpha() {
        let (i_1, i_2) = exact_pairs(80.0, &[2000.0, 4000.0, 8000.0, 16000.0, 32000.0]);
        let model = SingleCalibration::new(i_1, i_2).unwrap();
        let at = |a: f64| model.log_density(&[a]);
        assert!(at(80.0) > at(40.0));
        assert!(at(80.0) > at(160.0));
        assert_eq!(at(0.0), f64::NEG_INFINITY);
        assert_relative_eq!(model.initial_point()[0], 80.0, epsilon = 1e-9);
        assert!(SingleCalibration::new(vec![1.0], vec![]).is_err());
    }

    proptest! {
        #[test]
        fn non_centered_factor_stays_positive(
            mu in 1e-9f64..4096.0,
            tau in 0.0f64..1e3,
            raw in 0.0f64..1e3,
        ) {
            prop_assert!(non_centered(mu, tau, raw) > 0.0);
        }
    }
}
